use time::Date;

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{BookId, Loan, LoanId, MemberId};
use crate::KernelError;

/// Loan lists come back in default order: end date descending.
#[async_trait::async_trait]
pub trait LoanQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError>;
    async fn find_by_book_id(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError>;
    async fn find_by_member_id(
        &self,
        con: &mut Self::Transaction,
        member_id: &MemberId,
    ) -> error_stack::Result<Vec<Loan>, KernelError>;
    /// Counts loans on `book_id` whose end date is on or after `today`, leaving out `excluding`.
    async fn count_active_by_book_id(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
        today: &Date,
        excluding: Option<&LoanId>,
    ) -> error_stack::Result<i64, KernelError>;
}

pub trait DependOnLoanQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type LoanQuery: LoanQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn loan_query(&self) -> &Self::LoanQuery;
}
