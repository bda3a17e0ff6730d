use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::prelude::entity::{Book, BookState, DestructBook, Loan};
use kernel::prelude::lending::LendingStatus;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub release_date: Option<Date>,
    pub last_updated: Option<OffsetDateTime>,
    pub authors: Vec<Uuid>,
    pub category_id: Option<Uuid>,
    pub state: BookState,
    pub image: Option<Vec<u8>>,
    pub is_lent: bool,
    pub last_loan_end: Option<Date>,
    pub loans: Vec<Uuid>,
}

impl BookDto {
    /// `loans` must be the book's loans in default order.
    pub(crate) fn new(book: Book, loans: &[Loan], today: &Date) -> Self {
        let status = LendingStatus::evaluate(loans, today);
        let DestructBook {
            id,
            title,
            release_date,
            last_updated,
            authors,
            category_id,
            state,
            image,
        } = book.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            release_date: release_date.map(Into::into),
            last_updated: last_updated.map(Into::into),
            authors: authors.iter().map(|author| *author.as_ref()).collect(),
            category_id: category_id.map(Into::into),
            state,
            image: image.map(Into::into),
            is_lent: status.is_lent(),
            last_loan_end: status.last_loan_end().map(|end| *end.as_ref()),
            loans: loans.iter().map(|loan| *loan.id().as_ref()).collect(),
        }
    }
}

pub struct GetBookDto {
    pub id: Uuid,
}

pub struct CreateBookDto {
    pub title: String,
    pub release_date: Option<Date>,
    pub authors: Vec<Uuid>,
    pub category_id: Option<Uuid>,
    pub image: Option<Vec<u8>>,
}

/// `None` leaves a field as stored. For the optional fields `Some(None)` clears the value.
#[derive(Default)]
pub struct UpdateBookDto {
    pub id: Uuid,
    pub title: Option<String>,
    pub release_date: Option<Option<Date>>,
    pub authors: Option<Vec<Uuid>>,
    pub category_id: Option<Option<Uuid>>,
    pub image: Option<Option<Vec<u8>>>,
}

pub struct TouchBookDto {
    pub id: Uuid,
}

pub struct DeleteBookDto {
    pub id: Uuid,
}

pub struct ChangeBookStateDto {
    pub id: Uuid,
    pub state: BookState,
}

#[derive(Debug, Clone, Default)]
pub struct BookCriteriaDto {
    pub title: Option<String>,
    pub category: Option<String>,
}

/// Books matching any of the criteria. No criteria matches every book.
#[derive(Debug, Clone, Default)]
pub struct SearchBooksDto {
    pub criteria: Vec<BookCriteriaDto>,
}
