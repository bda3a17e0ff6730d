use error_stack::Report;
use time::Date;

use crate::config::LendingConfig;
use crate::entity::{Loan, LoanEndDate, LoanStartDate};
use crate::{KernelError, LoanViolation};

pub fn ensure_valid_period(
    start: &LoanStartDate,
    end: &LoanEndDate,
) -> error_stack::Result<(), KernelError> {
    if start.as_ref() > end.as_ref() {
        return Err(
            Report::new(KernelError::Validation(LoanViolation::StartAfterEnd)).attach_printable(
                format!("start: {}, end: {}", start.as_ref(), end.as_ref()),
            ),
        );
    }
    Ok(())
}

/// `other_active` must not include the loan being written.
pub fn ensure_not_double_booked(other_active: i64) -> error_stack::Result<(), KernelError> {
    if other_active > 0 {
        return Err(
            Report::new(KernelError::Validation(LoanViolation::DoubleBooked))
                .attach_printable(format!("active loans on this book: {other_active}")),
        );
    }
    Ok(())
}

/// Fills in missing loan dates: the start defaults to `today`, the end to start plus the
/// configured loan period.
pub fn resolve_period(
    start: Option<Date>,
    end: Option<Date>,
    today: Date,
    config: &LendingConfig,
) -> error_stack::Result<(LoanStartDate, LoanEndDate), KernelError> {
    let start = start.unwrap_or(today);
    let end = match end {
        Some(end) => end,
        None => start.checked_add(*config.loan_period()).ok_or_else(|| {
            Report::new(KernelError::Internal)
                .attach_printable(format!("loan period overflows from {start}"))
        })?,
    };
    Ok((LoanStartDate::new(start), LoanEndDate::new(end)))
}

/// Derived lending view of one book, computed from its loans in default order
/// (end date descending).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LendingStatus {
    is_lent: bool,
    last_loan_end: Option<LoanEndDate>,
}

impl LendingStatus {
    pub fn evaluate(loans: &[Loan], today: &Date) -> Self {
        let last_loan_end = loans
            .iter()
            .find(|loan| loan.is_active(today))
            .map(|loan| loan.end_date().clone());
        Self {
            is_lent: last_loan_end.is_some(),
            last_loan_end,
        }
    }

    pub fn is_lent(&self) -> bool {
        self.is_lent
    }

    pub fn last_loan_end(&self) -> Option<&LoanEndDate> {
        self.last_loan_end.as_ref()
    }
}
