use std::fmt::Display;

use error_stack::Context;

use crate::entity::BookState;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoanViolation {
    DoubleBooked,
    StartAfterEnd,
}

impl Display for LoanViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanViolation::DoubleBooked => write!(f, "Book is lent"),
            LoanViolation::StartAfterEnd => write!(f, "Start date after end date"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum KernelError {
    IllegalTransition { from: BookState, to: BookState },
    Validation(LoanViolation),
    NotFound,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::IllegalTransition { from, to } => {
                write!(f, "Moving from {from} to {to} is not allowed")
            }
            KernelError::Validation(violation) => write!(f, "Validation failed: {violation}"),
            KernelError::NotFound => write!(f, "Record not found"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
