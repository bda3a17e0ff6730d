use time::Date;
use uuid::Uuid;

use kernel::prelude::entity::{DestructLoan, Loan};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LoanDto {
    pub id: Uuid,
    pub member_id: Uuid,
    pub book_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
}

impl From<Loan> for LoanDto {
    fn from(value: Loan) -> Self {
        let DestructLoan {
            id,
            member_id,
            book_id,
            start_date,
            end_date,
        } = value.into_destruct();
        Self {
            id: id.into(),
            member_id: member_id.into(),
            book_id: book_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

pub struct GetLoanDto {
    pub id: Uuid,
}

pub struct GetLoansFromBookIdDto {
    pub book_id: Uuid,
}

pub struct GetLoansFromMemberIdDto {
    pub member_id: Uuid,
}

/// Missing dates fall back to today and today plus the configured loan period.
pub struct CreateLoanDto {
    pub member_id: Uuid,
    pub book_id: Uuid,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Default)]
pub struct UpdateLoanDto {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}
