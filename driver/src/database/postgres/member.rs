use error_stack::Report;
use sqlx::PgConnection;
use time::Date;
use uuid::Uuid;

use kernel::interface::query::MemberQuery;
use kernel::interface::update::MemberModifier;
use kernel::prelude::entity::{
    Contact, ContactEmail, ContactId, ContactImage, ContactName, DateOfBirth, Member, MemberId,
    MemberNumber, MemberSince, MembershipEnd, SelectLimit, SelectOffset,
};
use kernel::KernelError;

use crate::database::postgres::{PgContactInternal, PostgresTransaction};
use crate::error::ConvertError;

pub struct PostgresMemberRepository;

#[async_trait::async_trait]
impl MemberQuery for PostgresMemberRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &MemberId,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        PgMemberInternal::find_by_id(con, id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Member>, KernelError> {
        PgMemberInternal::find_all(con, limit, offset).await
    }
}

#[async_trait::async_trait]
impl MemberModifier for PostgresMemberRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        PgMemberInternal::create(con, member).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        PgMemberInternal::update(con, member).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        member_id: &MemberId,
    ) -> error_stack::Result<(), KernelError> {
        PgMemberInternal::delete(con, member_id).await
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    member_since: Option<Date>,
    membership_end: Option<Date>,
    member_number: String,
    date_of_birth: Option<Date>,
    contact_id: Uuid,
    name: String,
    email: Option<String>,
    image: Option<Vec<u8>>,
}

impl From<MemberRow> for Member {
    fn from(value: MemberRow) -> Self {
        let contact = Contact::new(
            ContactId::new(value.contact_id),
            ContactName::new(value.name),
            value.email.map(ContactEmail::new),
            value.image.map(ContactImage::new),
        );
        Member::new(
            MemberId::new(value.id),
            contact,
            value.member_since.map(MemberSince::new),
            value.membership_end.map(MembershipEnd::new),
            MemberNumber::new(value.member_number),
            value.date_of_birth.map(DateOfBirth::new),
        )
    }
}

pub(in crate::database) struct PgMemberInternal;

impl PgMemberInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &MemberId,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        let row = sqlx::query_as::<_, MemberRow>(
            // language=postgresql
            r#"
            SELECT
                m.id, m.member_since, m.membership_end, m.member_number, m.date_of_birth,
                c.id AS contact_id, c.name, c.email, c.image
            FROM members m
            JOIN contacts c ON c.id = m.contact_id
            WHERE m.id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Member::from))
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Member>, KernelError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            // language=postgresql
            r#"
            SELECT
                m.id, m.member_since, m.membership_end, m.member_number, m.date_of_birth,
                c.id AS contact_id, c.name, c.email, c.image
            FROM members m
            JOIN contacts c ON c.id = m.contact_id
            ORDER BY m.member_number, m.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn create(con: &mut PgConnection, member: &Member) -> error_stack::Result<(), KernelError> {
        PgContactInternal::upsert(&mut *con, member.contact()).await?;
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO members (id, contact_id, member_since, membership_end, member_number, date_of_birth)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(member.id().as_ref())
        .bind(member.contact_id().as_ref())
        .bind(member.member_since().as_ref().map(|date| *date.as_ref()))
        .bind(member.membership_end().as_ref().map(|date| *date.as_ref()))
        .bind(member.member_number().as_ref())
        .bind(member.date_of_birth().as_ref().map(|date| *date.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, member: &Member) -> error_stack::Result<(), KernelError> {
        PgContactInternal::upsert(&mut *con, member.contact()).await?;
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE members
            SET contact_id = $2, member_since = $3, membership_end = $4, member_number = $5, date_of_birth = $6
            WHERE id = $1
            "#,
        )
        .bind(member.id().as_ref())
        .bind(member.contact_id().as_ref())
        .bind(member.member_since().as_ref().map(|date| *date.as_ref()))
        .bind(member.membership_end().as_ref().map(|date| *date.as_ref()))
        .bind(member.member_number().as_ref())
        .bind(member.date_of_birth().as_ref().map(|date| *date.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("member id: {}", member.id().as_ref())));
        }
        Ok(())
    }

    /// Removes the wrapped contact; the member row goes with it through the cascade.
    async fn delete(
        con: &mut PgConnection,
        member_id: &MemberId,
    ) -> error_stack::Result<(), KernelError> {
        let contact_id = sqlx::query_scalar::<_, Uuid>(
            // language=postgresql
            r#"
            SELECT contact_id
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(member_id.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        match contact_id {
            Some(contact_id) => PgContactInternal::delete(con, &ContactId::new(contact_id)).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::{ContactQuery, MemberQuery};
    use kernel::interface::update::MemberModifier;
    use kernel::prelude::entity::{
        Contact, ContactId, ContactName, Member, MemberId, MemberNumber, MemberSince,
        SelectLimit, SelectOffset,
    };
    use kernel::KernelError;

    use crate::database::postgres::{
        PostgresContactRepository, PostgresDatabase, PostgresMemberRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let contact_id = ContactId::new(Uuid::new_v4());
        let id = MemberId::new(Uuid::new_v4());
        let member = Member::new(
            id.clone(),
            Contact::new(contact_id.clone(), ContactName::new("Le Guin"), None, None),
            Some(MemberSince::new(date!(2024 - 01 - 01))),
            None,
            MemberNumber::new(format!("pg-{}", Uuid::new_v4())),
            None,
        );
        PostgresMemberRepository.create(&mut con, &member).await?;

        let found = PostgresMemberRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(member.clone()));

        let all = PostgresMemberRepository
            .find_all(&mut con, &SelectLimit::new(1000), &SelectOffset::default())
            .await?;
        assert!(all.contains(&member));

        let member = member.reconstruct(|m| m.member_number = MemberNumber::new("renumbered"));
        PostgresMemberRepository.update(&mut con, &member).await?;
        let found = PostgresMemberRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(member));

        PostgresMemberRepository.delete(&mut con, &id).await?;
        assert!(PostgresMemberRepository
            .find_by_id(&mut con, &id)
            .await?
            .is_none());
        assert!(PostgresContactRepository
            .find_by_id(&mut con, &contact_id)
            .await?
            .is_none());
        Ok(())
    }
}
