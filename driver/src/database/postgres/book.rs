use error_stack::Report;
use sqlx::PgConnection;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::query::{BookCriteria, BookQuery};
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    Book, BookAuthors, BookId, BookImage, BookReleaseDate, BookTitle, BookUpdatedAt, CategoryId,
    ContactId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id).await
    }

    async fn find_by_criteria(
        &self,
        con: &mut PostgresTransaction,
        criteria: &BookCriteria,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_by_criteria(con, criteria).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con, book).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update(con, book).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::delete(con, book_id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    release_date: Option<Date>,
    last_updated: Option<OffsetDateTime>,
    category_id: Option<Uuid>,
    state: String,
    image: Option<Vec<u8>>,
    authors: Vec<Uuid>,
}

impl TryFrom<BookRow> for Book {
    type Error = Report<KernelError>;
    fn try_from(value: BookRow) -> Result<Self, Self::Error> {
        Ok(Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            value.release_date.map(BookReleaseDate::new),
            value.last_updated.map(BookUpdatedAt::new),
            BookAuthors::new(value.authors.into_iter().map(ContactId::new)),
            value.category_id.map(CategoryId::new),
            value.state.parse()?,
            value.image.map(BookImage::new),
        ))
    }
}

/// Escapes LIKE metacharacters so user input only matches literally.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT
                b.id, b.title, b.release_date, b.last_updated, b.category_id, b.state, b.image,
                COALESCE(
                    array_agg(a.contact_id ORDER BY a.position) FILTER (WHERE a.contact_id IS NOT NULL),
                    '{}'::UUID[]
                ) AS authors
            FROM books b
            LEFT JOIN book_authors a ON a.book_id = b.id
            WHERE b.id = $1
            GROUP BY b.id
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Book::try_from).transpose()
    }

    async fn find_by_criteria(
        con: &mut PgConnection,
        criteria: &BookCriteria,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let title = criteria.title.as_deref().map(like_pattern);
        let category = criteria
            .category
            .as_ref()
            .map(|name| AsRef::<String>::as_ref(name).as_str());
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT
                b.id, b.title, b.release_date, b.last_updated, b.category_id, b.state, b.image,
                COALESCE(
                    array_agg(a.contact_id ORDER BY a.position) FILTER (WHERE a.contact_id IS NOT NULL),
                    '{}'::UUID[]
                ) AS authors
            FROM books b
            LEFT JOIN categories c ON c.id = b.category_id
            LEFT JOIN book_authors a ON a.book_id = b.id
            WHERE ($1::TEXT IS NULL OR b.title ILIKE $1)
              AND ($2::TEXT IS NULL OR c.name = $2)
            GROUP BY b.id
            ORDER BY b.title, b.id
            "#,
        )
        .bind(title)
        .bind(category)
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO books (id, title, release_date, last_updated, category_id, state, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.release_date().as_ref().map(|date| *date.as_ref()))
        .bind(book.last_updated().as_ref().map(|at| *at.as_ref()))
        .bind(book.category_id().as_ref().map(|id| *id.as_ref()))
        .bind(book.state().as_str())
        .bind(book.image().as_ref().map(AsRef::<Vec<u8>>::as_ref))
        .execute(&mut *con)
        .await
        .convert_error()?;
        Self::insert_authors(con, book).await
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE books
            SET title = $2, release_date = $3, last_updated = $4, category_id = $5, state = $6,
                image = $7
            WHERE id = $1
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.release_date().as_ref().map(|date| *date.as_ref()))
        .bind(book.last_updated().as_ref().map(|at| *at.as_ref()))
        .bind(book.category_id().as_ref().map(|id| *id.as_ref()))
        .bind(book.state().as_str())
        .bind(book.image().as_ref().map(AsRef::<Vec<u8>>::as_ref))
        .execute(&mut *con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("book id: {}", book.id().as_ref())));
        }

        // language=postgresql
        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book.id().as_ref())
            .execute(&mut *con)
            .await
            .convert_error()?;
        Self::insert_authors(con, book).await
    }

    async fn insert_authors(
        con: &mut PgConnection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        let authors = book
            .authors()
            .iter()
            .map(|author| *author.as_ref())
            .collect::<Vec<Uuid>>();
        if authors.is_empty() {
            return Ok(());
        }
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO book_authors (book_id, contact_id, position)
            SELECT $1, author.id, author.position
            FROM UNNEST($2::UUID[]) WITH ORDINALITY AS author(id, position)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(authors)
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn delete(con: &mut PgConnection, book_id: &BookId) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
