use error_stack::Report;
use uuid::Uuid;

use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::config::DependOnLendingConfig;
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    BookQuery, DependOnBookQuery, DependOnLoanQuery, DependOnMemberQuery, LoanQuery, MemberQuery,
};
use kernel::interface::update::{DependOnLoanModifier, LoanModifier};
use kernel::prelude::entity::{
    BookId, Loan, LoanEndDate, LoanId, LoanStartDate, MemberId,
};
use kernel::prelude::lending::{ensure_not_double_booked, ensure_valid_period, resolve_period};
use kernel::KernelError;

use crate::transfer::{
    CreateLoanDto, GetLoanDto, GetLoansFromBookIdDto, GetLoansFromMemberIdDto, LoanDto,
    UpdateLoanDto,
};

fn not_found(kind: &str, id: &Uuid) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("{kind} id: {id}"))
}

fn rejected(loan: &Uuid, report: Report<KernelError>) -> Report<KernelError> {
    tracing::warn!("Rejected loan {loan}: {}", report.current_context());
    report
}

#[async_trait::async_trait]
pub trait GetLoanService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnLoanQuery
{
    async fn get_loan(&self, dto: GetLoanDto) -> error_stack::Result<Option<LoanDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = LoanId::new(dto.id);
        let loan = self.loan_query().find_by_id(&mut connection, &id).await?;
        Ok(loan.map(LoanDto::from))
    }

    async fn get_loans_by_book(
        &self,
        dto: GetLoansFromBookIdDto,
    ) -> error_stack::Result<Vec<LoanDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let book_id = BookId::new(dto.book_id);
        let loans = self
            .loan_query()
            .find_by_book_id(&mut connection, &book_id)
            .await?;
        Ok(loans.into_iter().map(LoanDto::from).collect())
    }

    async fn get_loans_by_member(
        &self,
        dto: GetLoansFromMemberIdDto,
    ) -> error_stack::Result<Vec<LoanDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let member_id = MemberId::new(dto.member_id);
        let loans = self
            .loan_query()
            .find_by_member_id(&mut connection, &member_id)
            .await?;
        Ok(loans.into_iter().map(LoanDto::from).collect())
    }
}

impl<T> GetLoanService for T where T: DependOnDatabaseConnection + DependOnLoanQuery {}

#[async_trait::async_trait]
pub trait CreateLoanService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnMemberQuery
    + DependOnBookQuery
    + DependOnLoanQuery
    + DependOnLoanModifier
    + DependOnClock
    + DependOnLendingConfig
{
    /// Lends a book to a member. The loan is only written when its period is valid and no
    /// other active loan holds the book.
    async fn create_loan(&self, dto: CreateLoanDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let member_id = MemberId::new(dto.member_id);
        if self
            .member_query()
            .find_by_id(&mut connection, &member_id)
            .await?
            .is_none()
        {
            return Err(not_found("member", &dto.member_id));
        }
        let book_id = BookId::new(dto.book_id);
        if self
            .book_query()
            .find_by_id(&mut connection, &book_id)
            .await?
            .is_none()
        {
            return Err(not_found("book", &dto.book_id));
        }

        let uuid = Uuid::new_v4();
        let today = self.clock().today();
        let (start_date, end_date) =
            resolve_period(dto.start_date, dto.end_date, today, self.lending_config())?;
        ensure_valid_period(&start_date, &end_date).map_err(|report| rejected(&uuid, report))?;

        let active = self
            .loan_query()
            .count_active_by_book_id(&mut connection, &book_id, &today, None)
            .await?;
        ensure_not_double_booked(active).map_err(|report| rejected(&uuid, report))?;

        let loan = Loan::new(LoanId::new(uuid), member_id, book_id, start_date, end_date);
        self.loan_modifier().create(&mut connection, &loan).await?;
        connection.commit().await?;

        tracing::info!("Lent book {} to member {} as loan {uuid}", dto.book_id, dto.member_id);
        Ok(uuid)
    }
}

impl<T> CreateLoanService for T where
    T: DependOnDatabaseConnection
        + DependOnMemberQuery
        + DependOnBookQuery
        + DependOnLoanQuery
        + DependOnLoanModifier
        + DependOnClock
        + DependOnLendingConfig
{
}

#[async_trait::async_trait]
pub trait UpdateLoanService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnMemberQuery
    + DependOnBookQuery
    + DependOnLoanQuery
    + DependOnLoanModifier
    + DependOnClock
{
    /// Dates are always re-validated. Moving the loan to another book also re-checks that
    /// the target book is free, ignoring this loan itself.
    async fn update_loan(&self, dto: UpdateLoanDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = LoanId::new(dto.id);
        let mut loan = self
            .loan_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| not_found("loan", &dto.id))?;

        if let Some(member_id) = dto.member_id {
            if self
                .member_query()
                .find_by_id(&mut connection, &MemberId::new(member_id))
                .await?
                .is_none()
            {
                return Err(not_found("member", &member_id));
            }
        }
        let book_changed = match dto.book_id {
            Some(book_id) => {
                if self
                    .book_query()
                    .find_by_id(&mut connection, &BookId::new(book_id))
                    .await?
                    .is_none()
                {
                    return Err(not_found("book", &book_id));
                }
                loan.book_id().as_ref() != &book_id
            }
            None => false,
        };

        loan.substitute(|loan| {
            if let Some(member_id) = dto.member_id {
                *loan.member_id = MemberId::new(member_id);
            }
            if let Some(book_id) = dto.book_id {
                *loan.book_id = BookId::new(book_id);
            }
            if let Some(start_date) = dto.start_date {
                *loan.start_date = LoanStartDate::new(start_date);
            }
            if let Some(end_date) = dto.end_date {
                *loan.end_date = LoanEndDate::new(end_date);
            }
        });
        ensure_valid_period(loan.start_date(), loan.end_date())
            .map_err(|report| rejected(&dto.id, report))?;

        if book_changed {
            let today = self.clock().today();
            let active = self
                .loan_query()
                .count_active_by_book_id(&mut connection, loan.book_id(), &today, Some(&id))
                .await?;
            ensure_not_double_booked(active).map_err(|report| rejected(&dto.id, report))?;
        }

        self.loan_modifier().update(&mut connection, &loan).await?;
        connection.commit().await?;

        tracing::info!("Updated loan {}", dto.id);
        Ok(())
    }
}

impl<T> UpdateLoanService for T where
    T: DependOnDatabaseConnection
        + DependOnMemberQuery
        + DependOnBookQuery
        + DependOnLoanQuery
        + DependOnLoanModifier
        + DependOnClock
{
}

#[cfg(test)]
mod test {
    use time::macros::{date, datetime};
    use time::{Date, Duration};
    use uuid::Uuid;

    use driver::clock::ManualClock;
    use driver::module::InMemoryModule;
    use kernel::interface::config::LendingConfig;
    use kernel::{KernelError, LoanViolation};

    use crate::fixture::module_at;
    use crate::service::{
        CreateBookService, CreateLoanService, CreateMemberService, GetBookService,
        GetLoanService, UpdateLoanService,
    };
    use crate::transfer::{
        CreateBookDto, CreateLoanDto, CreateMemberDto, GetBookDto, GetLoanDto,
        GetLoansFromBookIdDto, GetLoansFromMemberIdDto, UpdateLoanDto,
    };

    struct Library {
        module: InMemoryModule<ManualClock>,
        member: Uuid,
        book: Uuid,
    }

    async fn library() -> error_stack::Result<Library, KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let member = module
            .create_member(CreateMemberDto {
                name: "Shevek".to_string(),
                email: None,
                image: None,
                member_since: None,
                membership_end: None,
                member_number: "M-0001".to_string(),
                date_of_birth: None,
            })
            .await?;
        let book = create_book(&module, "The Dispossessed").await?;
        Ok(Library {
            module,
            member,
            book,
        })
    }

    async fn create_book(
        module: &InMemoryModule<ManualClock>,
        title: &str,
    ) -> error_stack::Result<Uuid, KernelError> {
        module
            .create_book(CreateBookDto {
                title: title.to_string(),
                release_date: None,
                authors: Vec::new(),
                category_id: None,
                image: None,
            })
            .await
    }

    fn loan_dto(library: &Library, start: Date, end: Date) -> CreateLoanDto {
        CreateLoanDto {
            member_id: library.member,
            book_id: library.book,
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    #[tokio::test]
    async fn start_after_end_is_rejected_and_not_stored() -> error_stack::Result<(), KernelError>
    {
        let library = library().await?;
        let report = library
            .module
            .create_loan(loan_dto(&library, date!(2024 - 01 - 10), date!(2024 - 01 - 01)))
            .await
            .expect_err("start after end");
        assert_eq!(
            report.current_context(),
            &KernelError::Validation(LoanViolation::StartAfterEnd)
        );

        let loans = library
            .module
            .get_loans_by_book(GetLoansFromBookIdDto {
                book_id: library.book,
            })
            .await?;
        assert!(loans.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn active_loan_blocks_second_loan() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        library
            .module
            .create_loan(loan_dto(&library, date!(2024 - 01 - 01), date!(2024 - 01 - 10)))
            .await?;

        let report = library
            .module
            .create_loan(loan_dto(&library, date!(2024 - 01 - 05), date!(2024 - 01 - 08)))
            .await
            .expect_err("book is lent");
        assert_eq!(
            report.current_context(),
            &KernelError::Validation(LoanViolation::DoubleBooked)
        );

        let loans = library
            .module
            .get_loans_by_book(GetLoansFromBookIdDto {
                book_id: library.book,
            })
            .await?;
        assert_eq!(loans.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn ended_loans_do_not_block() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        library
            .module
            .create_loan(loan_dto(&library, date!(2023 - 12 - 01), date!(2023 - 12 - 10)))
            .await?;
        library
            .module
            .create_loan(loan_dto(&library, date!(2023 - 12 - 20), date!(2024 - 01 - 04)))
            .await?;
        let current = library
            .module
            .create_loan(loan_dto(&library, date!(2024 - 01 - 05), date!(2024 - 01 - 12)))
            .await?;

        let loans = library
            .module
            .get_loans_by_member(GetLoansFromMemberIdDto {
                member_id: library.member,
            })
            .await?;
        let ends = loans.iter().map(|loan| loan.end_date).collect::<Vec<_>>();
        assert_eq!(
            ends,
            vec![
                date!(2024 - 01 - 12),
                date!(2024 - 01 - 04),
                date!(2023 - 12 - 10)
            ]
        );
        assert_eq!(loans[0].id, current);
        Ok(())
    }

    #[tokio::test]
    async fn loan_makes_book_lent() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        let book = library
            .module
            .get_book(GetBookDto { id: library.book })
            .await?
            .expect("exists");
        assert!(!book.is_lent);

        library
            .module
            .create_loan(CreateLoanDto {
                member_id: library.member,
                book_id: library.book,
                start_date: None,
                end_date: None,
            })
            .await?;
        let book = library
            .module
            .get_book(GetBookDto { id: library.book })
            .await?
            .expect("exists");
        assert!(book.is_lent);
        Ok(())
    }

    #[tokio::test]
    async fn default_period_is_six_days() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        let id = library
            .module
            .create_loan(CreateLoanDto {
                member_id: library.member,
                book_id: library.book,
                start_date: None,
                end_date: None,
            })
            .await?;

        let loan = library
            .module
            .get_loan(GetLoanDto { id })
            .await?
            .expect("loan was created");
        assert_eq!(loan.start_date, date!(2024 - 01 - 05));
        assert_eq!(loan.end_date, date!(2024 - 01 - 11));
        Ok(())
    }

    #[tokio::test]
    async fn configured_period_applies() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        let module = library
            .module
            .clone()
            .with_lending_config(LendingConfig::new(Duration::days(14)));
        let id = module
            .create_loan(CreateLoanDto {
                member_id: library.member,
                book_id: library.book,
                start_date: Some(date!(2024 - 01 - 06)),
                end_date: None,
            })
            .await?;

        let loan = module.get_loan(GetLoanDto { id }).await?.expect("exists");
        assert_eq!(loan.end_date, date!(2024 - 01 - 20));
        Ok(())
    }

    #[tokio::test]
    async fn missing_references_are_not_found() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        let report = library
            .module
            .create_loan(CreateLoanDto {
                member_id: Uuid::new_v4(),
                book_id: library.book,
                start_date: None,
                end_date: None,
            })
            .await
            .expect_err("no such member");
        assert_eq!(report.current_context(), &KernelError::NotFound);

        let report = library
            .module
            .create_loan(CreateLoanDto {
                member_id: library.member,
                book_id: Uuid::new_v4(),
                start_date: None,
                end_date: None,
            })
            .await
            .expect_err("no such book");
        assert_eq!(report.current_context(), &KernelError::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn update_rechecks_dates_and_target_book() -> error_stack::Result<(), KernelError> {
        let library = library().await?;
        let first = library
            .module
            .create_loan(loan_dto(&library, date!(2024 - 01 - 01), date!(2024 - 01 - 10)))
            .await?;

        library
            .module
            .update_loan(UpdateLoanDto {
                id: first,
                end_date: Some(date!(2024 - 01 - 15)),
                ..Default::default()
            })
            .await?;

        let report = library
            .module
            .update_loan(UpdateLoanDto {
                id: first,
                start_date: Some(date!(2024 - 01 - 20)),
                ..Default::default()
            })
            .await
            .expect_err("start after end");
        assert_eq!(
            report.current_context(),
            &KernelError::Validation(LoanViolation::StartAfterEnd)
        );

        let other_book = create_book(&library.module, "The Word for World Is Forest").await?;
        let second = library
            .module
            .create_loan(CreateLoanDto {
                member_id: library.member,
                book_id: other_book,
                start_date: None,
                end_date: None,
            })
            .await?;
        let report = library
            .module
            .update_loan(UpdateLoanDto {
                id: second,
                book_id: Some(library.book),
                ..Default::default()
            })
            .await
            .expect_err("target book is lent");
        assert_eq!(
            report.current_context(),
            &KernelError::Validation(LoanViolation::DoubleBooked)
        );

        let stored = library
            .module
            .get_loan(GetLoanDto { id: second })
            .await?
            .expect("exists");
        assert_eq!(stored.book_id, other_book);
        let stored = library
            .module
            .get_loan(GetLoanDto { id: first })
            .await?
            .expect("exists");
        assert_eq!(stored.start_date, date!(2024 - 01 - 01));
        assert_eq!(stored.end_date, date!(2024 - 01 - 15));
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_loan_is_not_found() {
        let library = library().await.expect("fixture");
        let report = library
            .module
            .update_loan(UpdateLoanDto {
                id: Uuid::new_v4(),
                ..Default::default()
            })
            .await
            .expect_err("no such loan");
        assert_eq!(report.current_context(), &KernelError::NotFound);
    }
}
