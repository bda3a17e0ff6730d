use std::collections::HashMap;
use std::sync::Arc;

use error_stack::Report;
use tokio::sync::RwLock;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{
    Book, BookAuthors, BookId, Category, CategoryId, Contact, ContactId, Loan, LoanId, Member,
    MemberId,
};
use kernel::KernelError;

pub use self::{book::*, category::*, contact::*, loan::*, member::*};

mod book;
mod category;
mod contact;
mod loan;
mod member;

/// Row storage shared by the in-memory repositories. Foreign keys and cascades follow the
/// postgres schema in `migrations/`.
#[derive(Debug, Clone, Default)]
struct Tables {
    contacts: HashMap<ContactId, Contact>,
    members: HashMap<MemberId, Member>,
    categories: HashMap<CategoryId, Category>,
    books: HashMap<BookId, Book>,
    loans: HashMap<LoanId, Loan>,
}

/// One row-level write. A transaction applies each change to its snapshot as it goes and
/// replays the whole log onto the shared tables when it commits.
#[derive(Debug, Clone)]
enum Change {
    PutContact(Contact),
    PutMember(Member),
    PutCategory(Category),
    PutBook(Book),
    PutLoan(Loan),
    DeleteContact(ContactId),
    DeleteMember(MemberId),
    DeleteCategory(CategoryId),
    DeleteBook(BookId),
    DeleteLoan(LoanId),
}

impl Tables {
    /// Reference checks run before any row is touched, so a failed change leaves the tables as
    /// they were.
    fn apply(&mut self, change: &Change) -> error_stack::Result<(), KernelError> {
        match change {
            Change::PutContact(contact) => {
                self.contacts.insert(contact.id().clone(), contact.clone());
            }
            Change::PutMember(member) => {
                let taken = self.members.values().any(|other| {
                    other.contact_id() == member.contact_id() && other.id() != member.id()
                });
                if taken {
                    return Err(duplicate_key("member contact", member.contact_id().as_ref()));
                }
                self.contacts
                    .insert(member.contact_id().clone(), member.contact().clone());
                self.members.insert(member.id().clone(), member.clone());
            }
            Change::PutCategory(category) => {
                if let Some(parent_id) = category.parent_id() {
                    if !self.categories.contains_key(parent_id) {
                        return Err(missing_reference("category", parent_id.as_ref()));
                    }
                }
                self.categories
                    .insert(category.id().clone(), category.clone());
            }
            Change::PutBook(book) => {
                if let Some(category_id) = book.category_id() {
                    if !self.categories.contains_key(category_id) {
                        return Err(missing_reference("category", category_id.as_ref()));
                    }
                }
                if let Some(author) = book
                    .authors()
                    .iter()
                    .find(|author| !self.contacts.contains_key(*author))
                {
                    return Err(missing_reference("contact", author.as_ref()));
                }
                self.books.insert(book.id().clone(), book.clone());
            }
            Change::PutLoan(loan) => {
                if !self.books.contains_key(loan.book_id()) {
                    return Err(missing_reference("book", loan.book_id().as_ref()));
                }
                if !self.members.contains_key(loan.member_id()) {
                    return Err(missing_reference("member", loan.member_id().as_ref()));
                }
                self.loans.insert(loan.id().clone(), loan.clone());
            }
            Change::DeleteContact(contact_id) => self.delete_contact(contact_id),
            Change::DeleteMember(member_id) => self.delete_member(member_id),
            Change::DeleteCategory(category_id) => self.delete_category(category_id),
            Change::DeleteBook(book_id) => self.delete_book(book_id),
            Change::DeleteLoan(loan_id) => {
                self.loans.remove(loan_id);
            }
        }
        Ok(())
    }

    fn delete_contact(&mut self, contact_id: &ContactId) {
        self.contacts.remove(contact_id);
        let members = self
            .members
            .values()
            .filter(|member| member.contact_id() == contact_id)
            .map(|member| member.id().clone())
            .collect::<Vec<_>>();
        for member_id in members {
            self.delete_member_row(&member_id);
        }
        for book in self.books.values_mut() {
            if book.authors().contains(contact_id) {
                book.substitute(|book| {
                    *book.authors = BookAuthors::new(
                        book.authors
                            .iter()
                            .filter(|author| *author != contact_id)
                            .cloned(),
                    );
                });
            }
        }
    }

    /// A member goes away together with the contact it wraps.
    fn delete_member(&mut self, member_id: &MemberId) {
        let contact_id = self
            .members
            .get(member_id)
            .map(|member| member.contact_id().clone());
        match contact_id {
            Some(contact_id) => self.delete_contact(&contact_id),
            None => self.delete_member_row(member_id),
        }
    }

    fn delete_member_row(&mut self, member_id: &MemberId) {
        self.members.remove(member_id);
        self.loans.retain(|_, loan| loan.member_id() != member_id);
    }

    fn delete_book(&mut self, book_id: &BookId) {
        self.books.remove(book_id);
        self.loans.retain(|_, loan| loan.book_id() != book_id);
    }

    fn delete_category(&mut self, category_id: &CategoryId) {
        self.categories.remove(category_id);
        let children = self
            .categories
            .values()
            .filter(|category| category.parent_id().as_ref() == Some(category_id))
            .map(|category| category.id().clone())
            .collect::<Vec<_>>();
        for child in children {
            self.delete_category(&child);
        }
        for book in self.books.values_mut() {
            if book.category_id().as_ref() == Some(category_id) {
                book.substitute(|book| *book.category_id = None);
            }
        }
    }
}

fn missing_reference(table: &str, id: &uuid::Uuid) -> Report<KernelError> {
    Report::new(KernelError::Internal)
        .attach_printable(format!("Foreign key violation: {table} {id} does not exist"))
}

fn duplicate_key(table: &str, id: &uuid::Uuid) -> Report<KernelError> {
    Report::new(KernelError::Internal)
        .attach_printable(format!("Duplicate key: {table} {id} already exists"))
}

fn missing_row(table: &str, id: &uuid::Uuid) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("{table} id: {id}"))
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let snapshot = self.tables.read().await.clone();
        Ok(InMemoryTransaction {
            origin: Arc::clone(&self.tables),
            working: snapshot,
            changes: Vec::new(),
        })
    }
}

/// Reads from a private snapshot taken at `transact`. Writes land in the snapshot and in a
/// change log; `commit` replays the log onto whatever the shared tables hold by then.
pub struct InMemoryTransaction {
    origin: Arc<RwLock<Tables>>,
    working: Tables,
    changes: Vec<Change>,
}

impl InMemoryTransaction {
    fn record(&mut self, change: Change) -> error_stack::Result<(), KernelError> {
        self.working.apply(&change)?;
        self.changes.push(change);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    /// All or nothing: if a change no longer fits the shared tables (a concurrent commit removed
    /// a row it references), nothing is published.
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let mut tables = self.origin.write().await;
        let mut next = tables.clone();
        for change in &self.changes {
            next.apply(change).map_err(|report| {
                report.attach_printable("Commit conflicts with a concurrently committed write")
            })?;
        }
        tracing::debug!("Committed {} in-memory changes", self.changes.len());
        *tables = next;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}
