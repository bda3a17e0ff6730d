use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId, CategoryName};
use crate::KernelError;

/// One search clause: every given field must match. Clauses passed together are OR-ed.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BookCriteria {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Exact category name.
    pub category: Option<CategoryName>,
}

#[async_trait::async_trait]
pub trait BookQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;

    /// Books matching one clause. Case folding and the order of the result follow the
    /// backend: postgres uses `ILIKE` and the database collation, the in-memory store uses
    /// Unicode lowercasing and byte order. Callers needing a stable order sort on their own.
    async fn find_by_criteria(
        &self,
        con: &mut Self::Transaction,
        criteria: &BookCriteria,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
}

pub trait DependOnBookQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookQuery: BookQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_query(&self) -> &Self::BookQuery;
}
