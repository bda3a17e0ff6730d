use uuid::Uuid;

use kernel::prelude::entity::{Contact, DestructContact};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContactDto {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl From<Contact> for ContactDto {
    fn from(value: Contact) -> Self {
        let DestructContact {
            id,
            name,
            email,
            image,
        } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.map(Into::into),
            image: image.map(Into::into),
        }
    }
}

pub struct GetContactDto {
    pub id: Uuid,
}

pub struct CreateContactDto {
    pub name: String,
    pub email: Option<String>,
    pub image: Option<Vec<u8>>,
}
