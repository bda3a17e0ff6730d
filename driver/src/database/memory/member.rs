use kernel::interface::query::MemberQuery;
use kernel::interface::update::MemberModifier;
use kernel::prelude::entity::{select_window, Member, MemberId, SelectLimit, SelectOffset};
use kernel::KernelError;

use crate::database::memory::{duplicate_key, missing_row, Change, InMemoryTransaction, Tables};

pub struct InMemoryMemberRepository;

/// Members keep a copy of their contact; reads pick up the current row instead.
fn with_current_contact(tables: &Tables, member: &Member) -> Member {
    match tables.contacts.get(member.contact_id()) {
        Some(contact) => member
            .clone()
            .reconstruct(|member| member.contact = contact.clone()),
        None => member.clone(),
    }
}

#[async_trait::async_trait]
impl MemberQuery for InMemoryMemberRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &MemberId,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        let tables = &con.working;
        Ok(tables
            .members
            .get(id)
            .map(|member| with_current_contact(tables, member)))
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Member>, KernelError> {
        let tables = &con.working;
        let mut members = tables.members.values().collect::<Vec<_>>();
        members.sort_by(|a, b| {
            AsRef::<String>::as_ref(a.member_number())
                .cmp(AsRef::<String>::as_ref(b.member_number()))
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        let page = select_window(members, limit, offset);
        Ok(page
            .into_iter()
            .map(|member| with_current_contact(tables, member))
            .collect())
    }
}

#[async_trait::async_trait]
impl MemberModifier for InMemoryMemberRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        if con.working.members.contains_key(member.id()) {
            return Err(duplicate_key("member", member.id().as_ref()));
        }
        con.record(Change::PutMember(member.clone()))
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        if !con.working.members.contains_key(member.id()) {
            return Err(missing_row("member", member.id().as_ref()));
        }
        con.record(Change::PutMember(member.clone()))
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        member_id: &MemberId,
    ) -> error_stack::Result<(), KernelError> {
        con.record(Change::DeleteMember(member_id.clone()))
    }
}
