use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Contact, ContactId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ContactQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &ContactId,
    ) -> error_stack::Result<Option<Contact>, KernelError>;
}

pub trait DependOnContactQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ContactQuery: ContactQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn contact_query(&self) -> &Self::ContactQuery;
}
