use error_stack::Report;
use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::ContactQuery;
use kernel::interface::update::ContactModifier;
use kernel::prelude::entity::{Contact, ContactEmail, ContactId, ContactImage, ContactName};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresContactRepository;

#[async_trait::async_trait]
impl ContactQuery for PostgresContactRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ContactId,
    ) -> error_stack::Result<Option<Contact>, KernelError> {
        PgContactInternal::find_by_id(con, id).await
    }
}

#[async_trait::async_trait]
impl ContactModifier for PostgresContactRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        PgContactInternal::create(con, contact).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        PgContactInternal::update(con, contact).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        contact_id: &ContactId,
    ) -> error_stack::Result<(), KernelError> {
        PgContactInternal::delete(con, contact_id).await
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    image: Option<Vec<u8>>,
}

impl From<ContactRow> for Contact {
    fn from(value: ContactRow) -> Self {
        Contact::new(
            ContactId::new(value.id),
            ContactName::new(value.name),
            value.email.map(ContactEmail::new),
            value.image.map(ContactImage::new),
        )
    }
}

pub(in crate::database) struct PgContactInternal;

impl PgContactInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &ContactId,
    ) -> error_stack::Result<Option<Contact>, KernelError> {
        let row = sqlx::query_as::<_, ContactRow>(
            // language=postgresql
            r#"
            SELECT id, name, email, image
            FROM contacts
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Contact::from))
    }

    pub(in crate::database) async fn create(
        con: &mut PgConnection,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO contacts (id, name, email, image)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(contact.id().as_ref())
        .bind(contact.name().as_ref())
        .bind(contact.email().as_ref().map(AsRef::<String>::as_ref))
        .bind(contact.image().as_ref().map(AsRef::<Vec<u8>>::as_ref))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    /// Writes the contact whether or not it already exists. Used when a member wraps a contact.
    pub(in crate::database) async fn upsert(
        con: &mut PgConnection,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO contacts (id, name, email, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, email = EXCLUDED.email, image = EXCLUDED.image
            "#,
        )
        .bind(contact.id().as_ref())
        .bind(contact.name().as_ref())
        .bind(contact.email().as_ref().map(AsRef::<String>::as_ref))
        .bind(contact.image().as_ref().map(AsRef::<Vec<u8>>::as_ref))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        contact: &Contact,
    ) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE contacts
            SET name = $2, email = $3, image = $4
            WHERE id = $1
            "#,
        )
        .bind(contact.id().as_ref())
        .bind(contact.name().as_ref())
        .bind(contact.email().as_ref().map(AsRef::<String>::as_ref))
        .bind(contact.image().as_ref().map(AsRef::<Vec<u8>>::as_ref))
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("contact id: {}", contact.id().as_ref())));
        }
        Ok(())
    }

    pub(in crate::database) async fn delete(
        con: &mut PgConnection,
        contact_id: &ContactId,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM contacts
            WHERE id = $1
            "#,
        )
        .bind(contact_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
