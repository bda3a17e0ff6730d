use error_stack::Report;
use sqlx::PgConnection;
use time::Date;
use uuid::Uuid;

use kernel::interface::query::LoanQuery;
use kernel::interface::update::LoanModifier;
use kernel::prelude::entity::{
    BookId, Loan, LoanEndDate, LoanId, LoanStartDate, MemberId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresLoanRepository;

#[async_trait::async_trait]
impl LoanQuery for PostgresLoanRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        PgLoanInternal::find_by_id(con, id).await
    }

    async fn find_by_book_id(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        PgLoanInternal::find_by_book_id(con, book_id).await
    }

    async fn find_by_member_id(
        &self,
        con: &mut PostgresTransaction,
        member_id: &MemberId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        PgLoanInternal::find_by_member_id(con, member_id).await
    }

    async fn count_active_by_book_id(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
        today: &Date,
        excluding: Option<&LoanId>,
    ) -> error_stack::Result<i64, KernelError> {
        PgLoanInternal::count_active_by_book_id(con, book_id, today, excluding).await
    }
}

#[async_trait::async_trait]
impl LoanModifier for PostgresLoanRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError> {
        PgLoanInternal::create(con, loan).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError> {
        PgLoanInternal::update(con, loan).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        loan_id: &LoanId,
    ) -> error_stack::Result<(), KernelError> {
        PgLoanInternal::delete(con, loan_id).await
    }
}

#[derive(sqlx::FromRow)]
struct LoanRow {
    id: Uuid,
    member_id: Uuid,
    book_id: Uuid,
    start_date: Date,
    end_date: Date,
}

impl From<LoanRow> for Loan {
    fn from(value: LoanRow) -> Self {
        Loan::new(
            LoanId::new(value.id),
            MemberId::new(value.member_id),
            BookId::new(value.book_id),
            LoanStartDate::new(value.start_date),
            LoanEndDate::new(value.end_date),
        )
    }
}

pub(in crate::database) struct PgLoanInternal;

impl PgLoanInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let row = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT id, member_id, book_id, start_date, end_date
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Loan::from))
    }

    async fn find_by_book_id(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let rows = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT id, member_id, book_id, start_date, end_date
            FROM loans
            WHERE book_id = $1
            ORDER BY end_date DESC, id
            "#,
        )
        .bind(book_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    async fn find_by_member_id(
        con: &mut PgConnection,
        member_id: &MemberId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let rows = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT id, member_id, book_id, start_date, end_date
            FROM loans
            WHERE member_id = $1
            ORDER BY end_date DESC, id
            "#,
        )
        .bind(member_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    async fn count_active_by_book_id(
        con: &mut PgConnection,
        book_id: &BookId,
        today: &Date,
        excluding: Option<&LoanId>,
    ) -> error_stack::Result<i64, KernelError> {
        let count = sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COUNT(*)
            FROM loans
            WHERE book_id = $1
              AND end_date >= $2
              AND ($3::UUID IS NULL OR id <> $3)
            "#,
        )
        .bind(book_id.as_ref())
        .bind(today)
        .bind(excluding.map(|id| *id.as_ref()))
        .fetch_one(con)
        .await
        .convert_error()?;
        tracing::debug!("Active loans on book {}: {count}", book_id.as_ref());
        Ok(count)
    }

    async fn create(con: &mut PgConnection, loan: &Loan) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO loans (id, member_id, book_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(loan.id().as_ref())
        .bind(loan.member_id().as_ref())
        .bind(loan.book_id().as_ref())
        .bind(loan.start_date().as_ref())
        .bind(loan.end_date().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, loan: &Loan) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE loans
            SET member_id = $2, book_id = $3, start_date = $4, end_date = $5
            WHERE id = $1
            "#,
        )
        .bind(loan.id().as_ref())
        .bind(loan.member_id().as_ref())
        .bind(loan.book_id().as_ref())
        .bind(loan.start_date().as_ref())
        .bind(loan.end_date().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("loan id: {}", loan.id().as_ref())));
        }
        Ok(())
    }

    async fn delete(con: &mut PgConnection, loan_id: &LoanId) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::LoanQuery;
    use kernel::interface::update::{BookModifier, LoanModifier, MemberModifier};
    use kernel::prelude::entity::{
        Book, BookAuthors, BookId, BookState, BookTitle, Contact, ContactId, ContactName, Loan,
        LoanEndDate, LoanId, LoanStartDate, Member, MemberId, MemberNumber,
    };
    use kernel::KernelError;

    use crate::database::postgres::{
        PostgresBookRepository, PostgresDatabase, PostgresLoanRepository,
        PostgresMemberRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let book_id = BookId::new(Uuid::new_v4());
        let book = Book::new(
            book_id.clone(),
            BookTitle::new("title"),
            None,
            None,
            BookAuthors::default(),
            None,
            BookState::Available,
            None,
        );
        PostgresBookRepository.create(&mut con, &book).await?;

        let member_id = MemberId::new(Uuid::new_v4());
        let member = Member::new(
            member_id.clone(),
            Contact::new(ContactId::new(Uuid::new_v4()), ContactName::new("name"), None, None),
            None,
            None,
            MemberNumber::new("M-1"),
            None,
        );
        PostgresMemberRepository.create(&mut con, &member).await?;

        let old = Loan::new(
            LoanId::new(Uuid::new_v4()),
            member_id.clone(),
            book_id.clone(),
            LoanStartDate::new(date!(2023 - 12 - 01)),
            LoanEndDate::new(date!(2023 - 12 - 07)),
        );
        let current = Loan::new(
            LoanId::new(Uuid::new_v4()),
            member_id.clone(),
            book_id.clone(),
            LoanStartDate::new(date!(2024 - 01 - 01)),
            LoanEndDate::new(date!(2024 - 01 - 10)),
        );
        PostgresLoanRepository.create(&mut con, &old).await?;
        PostgresLoanRepository.create(&mut con, &current).await?;

        let loans = PostgresLoanRepository
            .find_by_book_id(&mut con, &book_id)
            .await?;
        assert_eq!(loans, vec![current.clone(), old.clone()]);

        let today = date!(2024 - 01 - 05);
        let active = PostgresLoanRepository
            .count_active_by_book_id(&mut con, &book_id, &today, None)
            .await?;
        assert_eq!(active, 1);
        let others = PostgresLoanRepository
            .count_active_by_book_id(&mut con, &book_id, &today, Some(current.id()))
            .await?;
        assert_eq!(others, 0);

        PostgresLoanRepository.delete(&mut con, old.id()).await?;
        let found = PostgresLoanRepository.find_by_id(&mut con, old.id()).await?;
        assert!(found.is_none());
        Ok(())
    }
}
