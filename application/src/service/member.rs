use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{DependOnMemberQuery, MemberQuery};
use kernel::interface::update::{DependOnMemberModifier, MemberModifier};
use kernel::prelude::entity::{
    Contact, ContactEmail, ContactId, ContactImage, ContactName, DateOfBirth, Member, MemberId,
    MemberNumber, MemberSince, MembershipEnd, SelectLimit, SelectOffset,
};
use kernel::KernelError;

use crate::transfer::{
    CreateMemberDto, DeleteMemberDto, GetAllMembersDto, GetMemberDto, MemberDto,
};

#[async_trait::async_trait]
pub trait GetMemberService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnMemberQuery
{
    async fn get_member(&self, dto: GetMemberDto) -> error_stack::Result<Option<MemberDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = MemberId::new(dto.id);
        let member = self.member_query().find_by_id(&mut connection, &id).await?;
        Ok(member.map(MemberDto::from))
    }

    async fn get_all_members(
        &self,
        dto: GetAllMembersDto,
    ) -> error_stack::Result<Vec<MemberDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let limit = dto.limit.map(SelectLimit::new).unwrap_or_default();
        let offset = dto.offset.map(SelectOffset::new).unwrap_or_default();
        let members = self
            .member_query()
            .find_all(&mut connection, &limit, &offset)
            .await?;
        Ok(members.into_iter().map(MemberDto::from).collect())
    }
}

impl<T> GetMemberService for T where T: DependOnDatabaseConnection + DependOnMemberQuery {}

#[async_trait::async_trait]
pub trait CreateMemberService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnMemberModifier
{
    /// Stores a fresh contact and the member wrapping it in one transaction.
    async fn create_member(&self, dto: CreateMemberDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let uuid = Uuid::new_v4();
        let contact = Contact::new(
            ContactId::new(Uuid::new_v4()),
            ContactName::new(dto.name),
            dto.email.map(ContactEmail::new),
            dto.image.map(ContactImage::new),
        );
        let member = Member::new(
            MemberId::new(uuid),
            contact,
            dto.member_since.map(MemberSince::new),
            dto.membership_end.map(MembershipEnd::new),
            MemberNumber::new(dto.member_number),
            dto.date_of_birth.map(DateOfBirth::new),
        );
        self.member_modifier()
            .create(&mut connection, &member)
            .await?;
        connection.commit().await?;

        tracing::info!("Created member {uuid}");
        Ok(uuid)
    }
}

impl<T> CreateMemberService for T where T: DependOnDatabaseConnection + DependOnMemberModifier {}

#[async_trait::async_trait]
pub trait DeleteMemberService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnMemberQuery + DependOnMemberModifier
{
    /// Removes the member together with its contact and loans.
    async fn delete_member(&self, dto: DeleteMemberDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = MemberId::new(dto.id);
        if self
            .member_query()
            .find_by_id(&mut connection, &id)
            .await?
            .is_none()
        {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("member id: {}", dto.id)));
        }
        self.member_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;

        tracing::info!("Deleted member {}", dto.id);
        Ok(())
    }
}

impl<T> DeleteMemberService for T where
    T: DependOnDatabaseConnection + DependOnMemberQuery + DependOnMemberModifier
{
}
