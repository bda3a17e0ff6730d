use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId};
use crate::KernelError;

/// Write side of the book catalogue. Authors are stored in the order the book lists them and
/// must already exist as contacts, as must the category if one is set.
#[async_trait::async_trait]
pub trait BookModifier: 'static + Sync + Send {
    type Transaction: Transaction;

    /// Fails when a book with the same id is already stored or a reference is dangling.
    async fn create(
        &self,
        con: &mut Self::Transaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;

    /// Overwrites every stored field, author list and state included. Reports
    /// [`KernelError::NotFound`] when the book is not stored.
    async fn update(
        &self,
        con: &mut Self::Transaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;

    /// Drops the book together with its loans. Deleting an unknown id is a no-op.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBookModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookModifier: BookModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_modifier(&self) -> &Self::BookModifier;
}
