mod id;
mod period;

pub use self::{id::*, period::*};
use crate::entity::{BookId, MemberId};
use destructure::{Destructure, Mutation};
use time::Date;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Loan {
    id: LoanId,
    member_id: MemberId,
    book_id: BookId,
    start_date: LoanStartDate,
    end_date: LoanEndDate,
}

impl Loan {
    pub fn new(
        id: LoanId,
        member_id: MemberId,
        book_id: BookId,
        start_date: LoanStartDate,
        end_date: LoanEndDate,
    ) -> Self {
        Self {
            id,
            member_id,
            book_id,
            start_date,
            end_date,
        }
    }

    /// A loan stays active through its whole end date.
    pub fn is_active(&self, today: &Date) -> bool {
        self.end_date.as_ref() >= today
    }
}
