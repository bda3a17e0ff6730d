use kernel::interface::query::{BookCriteria, BookQuery};
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{Book, BookId};
use kernel::KernelError;

use crate::database::memory::{duplicate_key, missing_row, Change, InMemoryTransaction};

pub struct InMemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.working.books.get(id).cloned())
    }

    async fn find_by_criteria(
        &self,
        con: &mut InMemoryTransaction,
        criteria: &BookCriteria,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let tables = &con.working;
        let title = criteria.title.as_ref().map(|title| title.to_lowercase());
        let mut found = tables
            .books
            .values()
            .filter(|book| match &title {
                Some(title) => AsRef::<String>::as_ref(book.title())
                    .to_lowercase()
                    .contains(title.as_str()),
                None => true,
            })
            .filter(|book| match &criteria.category {
                Some(name) => book
                    .category_id()
                    .as_ref()
                    .and_then(|id| tables.categories.get(id))
                    .is_some_and(|category| category.name() == name),
                None => true,
            })
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by(|a, b| {
            AsRef::<String>::as_ref(a.title())
                .cmp(AsRef::<String>::as_ref(b.title()))
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        Ok(found)
    }
}

#[async_trait::async_trait]
impl BookModifier for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        if con.working.books.contains_key(book.id()) {
            return Err(duplicate_key("book", book.id().as_ref()));
        }
        con.record(Change::PutBook(book.clone()))
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        if !con.working.books.contains_key(book.id()) {
            return Err(missing_row("book", book.id().as_ref()));
        }
        con.record(Change::PutBook(book.clone()))
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        con.record(Change::DeleteBook(book_id.clone()))
    }
}
