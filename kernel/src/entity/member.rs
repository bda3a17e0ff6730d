mod dates;
mod id;
mod number;

pub use self::{dates::*, id::*, number::*};
use crate::entity::{Contact, ContactEmail, ContactId, ContactImage, ContactName};
use destructure::{Destructure, Mutation};
use vodca::References;

/// A library member. Identity data lives on the wrapped [`Contact`]; the member adds
/// registration details on top of it.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Member {
    id: MemberId,
    contact: Contact,
    member_since: Option<MemberSince>,
    membership_end: Option<MembershipEnd>,
    member_number: MemberNumber,
    date_of_birth: Option<DateOfBirth>,
}

impl Member {
    pub fn new(
        id: MemberId,
        contact: Contact,
        member_since: Option<MemberSince>,
        membership_end: Option<MembershipEnd>,
        member_number: MemberNumber,
        date_of_birth: Option<DateOfBirth>,
    ) -> Self {
        Self {
            id,
            contact,
            member_since,
            membership_end,
            member_number,
            date_of_birth,
        }
    }

    pub fn contact_id(&self) -> &ContactId {
        self.contact.id()
    }

    pub fn name(&self) -> &ContactName {
        self.contact.name()
    }

    pub fn email(&self) -> Option<&ContactEmail> {
        self.contact.email().as_ref()
    }

    /// The member picture is the picture of the wrapped contact.
    pub fn image(&self) -> Option<&ContactImage> {
        self.contact.image().as_ref()
    }
}
