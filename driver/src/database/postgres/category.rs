use error_stack::Report;
use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::CategoryQuery;
use kernel::interface::update::CategoryModifier;
use kernel::prelude::entity::{Category, CategoryDescription, CategoryId, CategoryName};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresCategoryRepository;

#[async_trait::async_trait]
impl CategoryQuery for PostgresCategoryRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &CategoryId,
    ) -> error_stack::Result<Option<Category>, KernelError> {
        PgCategoryInternal::find_by_id(con, id).await
    }

    async fn find_children(
        &self,
        con: &mut PostgresTransaction,
        parent_id: &CategoryId,
    ) -> error_stack::Result<Vec<Category>, KernelError> {
        PgCategoryInternal::find_children(con, parent_id).await
    }
}

#[async_trait::async_trait]
impl CategoryModifier for PostgresCategoryRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        category: &Category,
    ) -> error_stack::Result<(), KernelError> {
        PgCategoryInternal::create(con, category).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        category: &Category,
    ) -> error_stack::Result<(), KernelError> {
        PgCategoryInternal::update(con, category).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        category_id: &CategoryId,
    ) -> error_stack::Result<(), KernelError> {
        PgCategoryInternal::delete(con, category_id).await
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    parent_id: Option<Uuid>,
}

impl From<CategoryRow> for Category {
    fn from(value: CategoryRow) -> Self {
        Category::new(
            CategoryId::new(value.id),
            CategoryName::new(value.name),
            value.description.map(CategoryDescription::new),
            value.parent_id.map(CategoryId::new),
        )
    }
}

pub(in crate::database) struct PgCategoryInternal;

impl PgCategoryInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &CategoryId,
    ) -> error_stack::Result<Option<Category>, KernelError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            // language=postgresql
            r#"
            SELECT id, name, description, parent_id
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Category::from))
    }

    async fn find_children(
        con: &mut PgConnection,
        parent_id: &CategoryId,
    ) -> error_stack::Result<Vec<Category>, KernelError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            // language=postgresql
            r#"
            SELECT id, name, description, parent_id
            FROM categories
            WHERE parent_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(parent_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        category: &Category,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO categories (id, name, description, parent_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(category.id().as_ref())
        .bind(category.name().as_ref())
        .bind(
            category
                .description()
                .as_ref()
                .map(AsRef::<String>::as_ref),
        )
        .bind(category.parent_id().as_ref().map(|id| *id.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        category: &Category,
    ) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE categories
            SET name = $2, description = $3, parent_id = $4
            WHERE id = $1
            "#,
        )
        .bind(category.id().as_ref())
        .bind(category.name().as_ref())
        .bind(
            category
                .description()
                .as_ref()
                .map(AsRef::<String>::as_ref),
        )
        .bind(category.parent_id().as_ref().map(|id| *id.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("category id: {}", category.id().as_ref())));
        }
        Ok(())
    }

    async fn delete(
        con: &mut PgConnection,
        category_id: &CategoryId,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::CategoryQuery;
    use kernel::interface::update::CategoryModifier;
    use kernel::prelude::entity::{Category, CategoryDescription, CategoryId, CategoryName};
    use kernel::KernelError;

    use crate::database::postgres::{PostgresCategoryRepository, PostgresDatabase};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let parent_id = CategoryId::new(Uuid::new_v4());
        let parent = Category::new(parent_id.clone(), CategoryName::new("Parent"), None, None);
        let child = Category::new(
            CategoryId::new(Uuid::new_v4()),
            CategoryName::new("Child"),
            Some(CategoryDescription::new("Description for child")),
            Some(parent_id.clone()),
        );
        PostgresCategoryRepository.create(&mut con, &parent).await?;
        PostgresCategoryRepository.create(&mut con, &child).await?;

        let children = PostgresCategoryRepository
            .find_children(&mut con, &parent_id)
            .await?;
        assert_eq!(children, vec![child.clone()]);

        PostgresCategoryRepository.delete(&mut con, &parent_id).await?;
        let found = PostgresCategoryRepository
            .find_by_id(&mut con, child.id())
            .await?;
        assert!(found.is_none());
        Ok(())
    }
}
