use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{CategoryQuery, DependOnCategoryQuery};
use kernel::interface::update::{CategoryModifier, DependOnCategoryModifier};
use kernel::prelude::entity::{Category, CategoryDescription, CategoryId, CategoryName};
use kernel::KernelError;

use crate::transfer::{CategoryDto, CreateCategoryDto, GetCategoryDto};

#[async_trait::async_trait]
pub trait GetCategoryService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnCategoryQuery
{
    async fn get_category(
        &self,
        dto: GetCategoryDto,
    ) -> error_stack::Result<Option<CategoryDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = CategoryId::new(dto.id);
        let Some(category) = self
            .category_query()
            .find_by_id(&mut connection, &id)
            .await?
        else {
            return Ok(None);
        };
        let children = self
            .category_query()
            .find_children(&mut connection, &id)
            .await?;
        Ok(Some(CategoryDto::new(category, children)))
    }
}

impl<T> GetCategoryService for T where T: DependOnDatabaseConnection + DependOnCategoryQuery {}

#[async_trait::async_trait]
pub trait CreateCategoryService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnCategoryModifier
{
    /// Creates the category and every nested child in one transaction, parents first.
    async fn create_category(&self, dto: CreateCategoryDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let root = Uuid::new_v4();
        let mut pending = vec![(root, dto.parent_id, dto)];
        while let Some((uuid, parent_id, dto)) = pending.pop() {
            let category = Category::new(
                CategoryId::new(uuid),
                CategoryName::new(dto.name),
                dto.description.map(CategoryDescription::new),
                parent_id.map(CategoryId::new),
            );
            self.category_modifier()
                .create(&mut connection, &category)
                .await?;
            pending.extend(
                dto.children
                    .into_iter()
                    .map(|child| (Uuid::new_v4(), Some(uuid), child)),
            );
        }
        connection.commit().await?;

        tracing::info!("Created category {root}");
        Ok(root)
    }
}

impl<T> CreateCategoryService for T where
    T: DependOnDatabaseConnection + DependOnCategoryModifier
{
}
