use time::Date;
use uuid::Uuid;

use kernel::prelude::entity::{DestructContact, DestructMember, Member};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MemberDto {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub image: Option<Vec<u8>>,
    pub member_since: Option<Date>,
    pub membership_end: Option<Date>,
    pub member_number: String,
    pub date_of_birth: Option<Date>,
}

impl From<Member> for MemberDto {
    fn from(value: Member) -> Self {
        let DestructMember {
            id,
            contact,
            member_since,
            membership_end,
            member_number,
            date_of_birth,
        } = value.into_destruct();
        let DestructContact {
            id: contact_id,
            name,
            email,
            image,
        } = contact.into_destruct();
        Self {
            id: id.into(),
            contact_id: contact_id.into(),
            name: name.into(),
            email: email.map(Into::into),
            image: image.map(Into::into),
            member_since: member_since.map(Into::into),
            membership_end: membership_end.map(Into::into),
            member_number: member_number.into(),
            date_of_birth: date_of_birth.map(Into::into),
        }
    }
}

pub struct GetMemberDto {
    pub id: Uuid,
}

#[derive(Default)]
pub struct GetAllMembersDto {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct CreateMemberDto {
    pub name: String,
    pub email: Option<String>,
    pub image: Option<Vec<u8>>,
    pub member_since: Option<Date>,
    pub membership_end: Option<Date>,
    pub member_number: String,
    pub date_of_birth: Option<Date>,
}

pub struct DeleteMemberDto {
    pub id: Uuid,
}
