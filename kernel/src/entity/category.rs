mod description;
mod id;
mod name;

pub use self::{description::*, id::*, name::*};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Category {
    id: CategoryId,
    name: CategoryName,
    description: Option<CategoryDescription>,
    parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: CategoryName,
        description: Option<CategoryDescription>,
        parent_id: Option<CategoryId>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            parent_id,
        }
    }
}
