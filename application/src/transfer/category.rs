use uuid::Uuid;

use kernel::prelude::entity::{Category, DestructCategory};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub children: Vec<Uuid>,
}

impl CategoryDto {
    pub(crate) fn new(category: Category, children: Vec<Category>) -> Self {
        let DestructCategory {
            id,
            name,
            description,
            parent_id,
        } = category.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            description: description.map(Into::into),
            parent_id: parent_id.map(Into::into),
            children: children
                .into_iter()
                .map(|child| *child.id().as_ref())
                .collect(),
        }
    }
}

pub struct GetCategoryDto {
    pub id: Uuid,
}

/// Children are created in the same transaction and parented to this category.
pub struct CreateCategoryDto {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub children: Vec<CreateCategoryDto>,
}
