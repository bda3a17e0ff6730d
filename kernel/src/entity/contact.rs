mod email;
mod id;
mod image;
mod name;

pub use self::{email::*, id::*, image::*, name::*};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Contact {
    id: ContactId,
    name: ContactName,
    email: Option<ContactEmail>,
    image: Option<ContactImage>,
}

impl Contact {
    pub fn new(
        id: ContactId,
        name: ContactName,
        email: Option<ContactEmail>,
        image: Option<ContactImage>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            image,
        }
    }
}
