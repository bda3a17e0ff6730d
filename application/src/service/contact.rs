use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{ContactQuery, DependOnContactQuery};
use kernel::interface::update::{ContactModifier, DependOnContactModifier};
use kernel::prelude::entity::{Contact, ContactEmail, ContactId, ContactImage, ContactName};
use kernel::KernelError;

use crate::transfer::{ContactDto, CreateContactDto, GetContactDto};

#[async_trait::async_trait]
pub trait GetContactService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnContactQuery
{
    async fn get_contact(
        &self,
        dto: GetContactDto,
    ) -> error_stack::Result<Option<ContactDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = ContactId::new(dto.id);
        let contact = self
            .contact_query()
            .find_by_id(&mut connection, &id)
            .await?;
        Ok(contact.map(ContactDto::from))
    }
}

impl<T> GetContactService for T where T: DependOnDatabaseConnection + DependOnContactQuery {}

#[async_trait::async_trait]
pub trait CreateContactService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnContactModifier
{
    async fn create_contact(&self, dto: CreateContactDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let uuid = Uuid::new_v4();
        let contact = Contact::new(
            ContactId::new(uuid),
            ContactName::new(dto.name),
            dto.email.map(ContactEmail::new),
            dto.image.map(ContactImage::new),
        );
        self.contact_modifier()
            .create(&mut connection, &contact)
            .await?;
        connection.commit().await?;

        tracing::info!("Created contact {uuid}");
        Ok(uuid)
    }
}

impl<T> CreateContactService for T where T: DependOnDatabaseConnection + DependOnContactModifier {}
