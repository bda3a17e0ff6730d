mod authors;
mod id;
mod image;
mod release_date;
mod state;
mod title;
mod updated_at;

pub use self::{
    authors::*, id::*, image::*, release_date::*, state::*, title::*, updated_at::*,
};
use crate::entity::CategoryId;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use error_stack::Report;
use time::OffsetDateTime;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    release_date: Option<BookReleaseDate>,
    last_updated: Option<BookUpdatedAt>,
    authors: BookAuthors,
    category_id: Option<CategoryId>,
    state: BookState,
    image: Option<BookImage>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        release_date: Option<BookReleaseDate>,
        last_updated: Option<BookUpdatedAt>,
        authors: BookAuthors,
        category_id: Option<CategoryId>,
        state: BookState,
        image: Option<BookImage>,
    ) -> Self {
        Self {
            id,
            title,
            release_date,
            last_updated,
            authors,
            category_id,
            state,
            image,
        }
    }

    /// Moves the book along the transition table. On rejection the state is left untouched.
    pub fn change_state(&mut self, to: BookState) -> error_stack::Result<(), KernelError> {
        if !self.state.can_transition_to(&to) {
            return Err(Report::new(KernelError::IllegalTransition {
                from: self.state,
                to,
            })
            .attach_printable(format!("book id: {}", self.id.as_ref())));
        }
        self.state = to;
        Ok(())
    }

    pub fn make_available(&mut self) -> error_stack::Result<(), KernelError> {
        self.change_state(BookState::Available)
    }

    pub fn make_borrowed(&mut self) -> error_stack::Result<(), KernelError> {
        self.change_state(BookState::Borrowed)
    }

    pub fn make_lost(&mut self) -> error_stack::Result<(), KernelError> {
        self.change_state(BookState::Lost)
    }

    pub fn touch(&mut self, now: OffsetDateTime) {
        self.last_updated = Some(BookUpdatedAt::new(now));
    }
}
