use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Contact, ContactId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ContactModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError>;
    async fn update(
        &self,
        con: &mut Self::Transaction,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError>;
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        contact_id: &ContactId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnContactModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type ContactModifier: ContactModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn contact_modifier(&self) -> &Self::ContactModifier;
}
