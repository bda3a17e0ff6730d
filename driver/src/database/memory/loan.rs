use time::Date;

use kernel::interface::query::LoanQuery;
use kernel::interface::update::LoanModifier;
use kernel::prelude::entity::{BookId, Loan, LoanId, MemberId};
use kernel::KernelError;

use crate::database::memory::{duplicate_key, missing_row, Change, InMemoryTransaction};

pub struct InMemoryLoanRepository;

fn sorted(mut loans: Vec<Loan>) -> Vec<Loan> {
    loans.sort_by(|a, b| {
        b.end_date()
            .cmp(a.end_date())
            .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
    });
    loans
}

#[async_trait::async_trait]
impl LoanQuery for InMemoryLoanRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        Ok(con.working.loans.get(id).cloned())
    }

    async fn find_by_book_id(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let loans = con
            .working
            .loans
            .values()
            .filter(|loan| loan.book_id() == book_id)
            .cloned()
            .collect();
        Ok(sorted(loans))
    }

    async fn find_by_member_id(
        &self,
        con: &mut InMemoryTransaction,
        member_id: &MemberId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let loans = con
            .working
            .loans
            .values()
            .filter(|loan| loan.member_id() == member_id)
            .cloned()
            .collect();
        Ok(sorted(loans))
    }

    async fn count_active_by_book_id(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
        today: &Date,
        excluding: Option<&LoanId>,
    ) -> error_stack::Result<i64, KernelError> {
        let count = con
            .working
            .loans
            .values()
            .filter(|loan| loan.book_id() == book_id)
            .filter(|loan| Some(loan.id()) != excluding)
            .filter(|loan| loan.is_active(today))
            .count();
        tracing::debug!("Active loans on book {}: {count}", book_id.as_ref());
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait::async_trait]
impl LoanModifier for InMemoryLoanRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError> {
        if con.working.loans.contains_key(loan.id()) {
            return Err(duplicate_key("loan", loan.id().as_ref()));
        }
        con.record(Change::PutLoan(loan.clone()))
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError> {
        if !con.working.loans.contains_key(loan.id()) {
            return Err(missing_row("loan", loan.id().as_ref()));
        }
        con.record(Change::PutLoan(loan.clone()))
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        loan_id: &LoanId,
    ) -> error_stack::Result<(), KernelError> {
        con.record(Change::DeleteLoan(loan_id.clone()))
    }
}
