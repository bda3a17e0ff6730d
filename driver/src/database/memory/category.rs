use kernel::interface::query::CategoryQuery;
use kernel::interface::update::CategoryModifier;
use kernel::prelude::entity::{Category, CategoryId};
use kernel::KernelError;

use crate::database::memory::{duplicate_key, missing_row, Change, InMemoryTransaction};

pub struct InMemoryCategoryRepository;

#[async_trait::async_trait]
impl CategoryQuery for InMemoryCategoryRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &CategoryId,
    ) -> error_stack::Result<Option<Category>, KernelError> {
        Ok(con.working.categories.get(id).cloned())
    }

    async fn find_children(
        &self,
        con: &mut InMemoryTransaction,
        parent_id: &CategoryId,
    ) -> error_stack::Result<Vec<Category>, KernelError> {
        let mut children = con
            .working
            .categories
            .values()
            .filter(|category| category.parent_id().as_ref() == Some(parent_id))
            .cloned()
            .collect::<Vec<_>>();
        children.sort_by(|a, b| {
            AsRef::<String>::as_ref(a.name())
                .cmp(AsRef::<String>::as_ref(b.name()))
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        Ok(children)
    }
}

#[async_trait::async_trait]
impl CategoryModifier for InMemoryCategoryRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        category: &Category,
    ) -> error_stack::Result<(), KernelError> {
        if con.working.categories.contains_key(category.id()) {
            return Err(duplicate_key("category", category.id().as_ref()));
        }
        con.record(Change::PutCategory(category.clone()))
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        category: &Category,
    ) -> error_stack::Result<(), KernelError> {
        if !con.working.categories.contains_key(category.id()) {
            return Err(missing_row("category", category.id().as_ref()));
        }
        con.record(Change::PutCategory(category.clone()))
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        category_id: &CategoryId,
    ) -> error_stack::Result<(), KernelError> {
        con.record(Change::DeleteCategory(category_id.clone()))
    }
}
