use kernel::interface::query::ContactQuery;
use kernel::interface::update::ContactModifier;
use kernel::prelude::entity::{Contact, ContactId};
use kernel::KernelError;

use crate::database::memory::{duplicate_key, missing_row, Change, InMemoryTransaction};

pub struct InMemoryContactRepository;

#[async_trait::async_trait]
impl ContactQuery for InMemoryContactRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &ContactId,
    ) -> error_stack::Result<Option<Contact>, KernelError> {
        Ok(con.working.contacts.get(id).cloned())
    }
}

#[async_trait::async_trait]
impl ContactModifier for InMemoryContactRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        if con.working.contacts.contains_key(contact.id()) {
            return Err(duplicate_key("contact", contact.id().as_ref()));
        }
        con.record(Change::PutContact(contact.clone()))
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        if !con.working.contacts.contains_key(contact.id()) {
            return Err(missing_row("contact", contact.id().as_ref()));
        }
        con.record(Change::PutContact(contact.clone()))
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        contact_id: &ContactId,
    ) -> error_stack::Result<(), KernelError> {
        con.record(Change::DeleteContact(contact_id.clone()))
    }
}
