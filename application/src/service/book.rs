use error_stack::Report;
use uuid::Uuid;

use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    BookCriteria, BookQuery, DependOnBookQuery, DependOnLoanQuery, LoanQuery,
};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    Book, BookAuthors, BookId, BookImage, BookReleaseDate, BookState, BookTitle, CategoryId,
    CategoryName, ContactId,
};
use kernel::KernelError;

use crate::transfer::{
    BookDto, ChangeBookStateDto, CreateBookDto, DeleteBookDto, GetBookDto, SearchBooksDto,
    TouchBookDto, UpdateBookDto,
};

fn book_not_found(id: &BookId) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("book id: {}", id.as_ref()))
}

#[async_trait::async_trait]
pub trait GetBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnLoanQuery + DependOnClock
{
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let Some(book) = self.book_query().find_by_id(&mut connection, &id).await? else {
            return Ok(None);
        };
        let loans = self
            .loan_query()
            .find_by_book_id(&mut connection, &id)
            .await?;

        Ok(Some(BookDto::new(book, &loans, &self.clock().today())))
    }
}

impl<T> GetBookService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnLoanQuery + DependOnClock
{
}

#[async_trait::async_trait]
pub trait SearchBooksService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnLoanQuery + DependOnClock
{
    async fn search_books(&self, dto: SearchBooksDto) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let mut criteria = dto
            .criteria
            .into_iter()
            .map(|criteria| BookCriteria {
                title: criteria.title,
                category: criteria.category.map(CategoryName::new),
            })
            .collect::<Vec<_>>();
        if criteria.is_empty() {
            criteria.push(BookCriteria::default());
        }

        let mut books: Vec<Book> = Vec::new();
        for criteria in criteria.iter() {
            let found = self
                .book_query()
                .find_by_criteria(&mut connection, criteria)
                .await?;
            for book in found {
                if !books.iter().any(|known| known.id() == book.id()) {
                    books.push(book);
                }
            }
        }
        // Backends disagree on collation, so the final order is fixed here.
        books.sort_by(|a, b| {
            AsRef::<String>::as_ref(a.title())
                .cmp(AsRef::<String>::as_ref(b.title()))
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        tracing::debug!("{} books matched {} criteria", books.len(), criteria.len());

        let today = self.clock().today();
        let mut result = Vec::with_capacity(books.len());
        for book in books {
            let loans = self
                .loan_query()
                .find_by_book_id(&mut connection, book.id())
                .await?;
            result.push(BookDto::new(book, &loans, &today));
        }
        Ok(result)
    }
}

impl<T> SearchBooksService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnLoanQuery + DependOnClock
{
}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookModifier
{
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let uuid = Uuid::new_v4();
        let book = Book::new(
            BookId::new(uuid),
            BookTitle::new(dto.title),
            dto.release_date.map(BookReleaseDate::new),
            None,
            BookAuthors::new(dto.authors.into_iter().map(ContactId::new)),
            dto.category_id.map(CategoryId::new),
            BookState::default(),
            dto.image.map(BookImage::new),
        );
        self.book_modifier().create(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::info!("Created book {uuid}");
        Ok(uuid)
    }
}

impl<T> CreateBookService for T where T: DependOnDatabaseConnection + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier + DependOnClock
{
    /// Outer `None` keeps a field, `Some(None)` clears it. Stamps the book's last update time
    /// with the clock's current instant.
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| book_not_found(&id))?;
        book.substitute(|book| {
            if let Some(title) = dto.title {
                *book.title = BookTitle::new(title);
            }
            if let Some(release_date) = dto.release_date {
                *book.release_date = release_date.map(BookReleaseDate::new);
            }
            if let Some(authors) = dto.authors {
                *book.authors = BookAuthors::new(authors.into_iter().map(ContactId::new));
            }
            if let Some(category_id) = dto.category_id {
                *book.category_id = category_id.map(CategoryId::new);
            }
            if let Some(image) = dto.image {
                *book.image = image.map(BookImage::new);
            }
        });
        book.touch(self.clock().now());

        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;
        Ok(())
    }

    async fn touch_book(&self, dto: TouchBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| book_not_found(&id))?;
        book.touch(self.clock().now());

        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;
        Ok(())
    }
}

impl<T> UpdateBookService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier + DependOnClock
{
}

#[async_trait::async_trait]
pub trait ChangeBookStateService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    /// Moves a stored book along the transition table. An illegal move leaves the stored
    /// book untouched.
    async fn change_book_state(&self, dto: ChangeBookStateDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| book_not_found(&id))?;
        let from = *book.state();
        if let Err(report) = book.change_state(dto.state) {
            tracing::warn!("Rejected state change of book {}: {from} -> {}", dto.id, dto.state);
            return Err(report);
        }

        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::info!("Book {} moved from {from} to {}", dto.id, dto.state);
        Ok(())
    }

    async fn make_available(&self, id: Uuid) -> error_stack::Result<(), KernelError> {
        self.change_book_state(ChangeBookStateDto {
            id,
            state: BookState::Available,
        })
        .await
    }

    async fn make_borrowed(&self, id: Uuid) -> error_stack::Result<(), KernelError> {
        self.change_book_state(ChangeBookStateDto {
            id,
            state: BookState::Borrowed,
        })
        .await
    }

    async fn make_lost(&self, id: Uuid) -> error_stack::Result<(), KernelError> {
        self.change_book_state(ChangeBookStateDto {
            id,
            state: BookState::Lost,
        })
        .await
    }
}

impl<T> ChangeBookStateService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
}

#[async_trait::async_trait]
pub trait DeleteBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookModifier
{
    /// Loans of the book go with it.
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        self.book_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;

        tracing::info!("Deleted book {}", dto.id);
        Ok(())
    }
}

impl<T> DeleteBookService for T where T: DependOnDatabaseConnection + DependOnBookModifier {}

#[cfg(test)]
mod test {
    use time::macros::{date, datetime};
    use time::Duration;
    use uuid::Uuid;

    use kernel::interface::clock::DependOnClock;
    use kernel::prelude::entity::BookState;
    use kernel::KernelError;

    use crate::fixture::{module_at, seed_contact};
    use crate::service::{
        ChangeBookStateService, CreateBookService, CreateCategoryService, CreateLoanService,
        CreateMemberService, DeleteBookService, GetBookService, GetLoanService,
        SearchBooksService, UpdateBookService,
    };
    use crate::transfer::{
        BookCriteriaDto, ChangeBookStateDto, CreateBookDto, CreateCategoryDto, CreateLoanDto,
        CreateMemberDto, DeleteBookDto, GetBookDto, GetLoanDto, SearchBooksDto, TouchBookDto,
        UpdateBookDto,
    };

    fn create_dto(title: &str) -> CreateBookDto {
        CreateBookDto {
            title: title.to_string(),
            release_date: None,
            authors: Vec::new(),
            category_id: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn created_book_starts_as_draft() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let author = seed_contact(&module, "Frank Herbert").await?;
        let id = module
            .create_book(CreateBookDto {
                authors: vec![author, author],
                release_date: Some(date!(1965 - 08 - 01)),
                image: Some(vec![0xFF, 0xD8, 0xFF]),
                ..create_dto("Dune")
            })
            .await?;

        let book = module
            .get_book(GetBookDto { id })
            .await?
            .expect("book was created");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.state, BookState::Draft);
        assert_eq!(book.authors, vec![author]);
        assert_eq!(book.release_date, Some(date!(1965 - 08 - 01)));
        assert_eq!(book.image, Some(vec![0xFF, 0xD8, 0xFF]));
        assert!(!book.is_lent);
        assert!(book.last_loan_end.is_none());
        assert!(book.loans.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_book_reads_as_none() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let found = module.get_book(GetBookDto { id: Uuid::new_v4() }).await?;
        assert!(found.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn stored_state_follows_lending_edges() -> error_stack::Result<(), KernelError> {
        use BookState::{Available, Borrowed, Draft, Lost};
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let edges = [
            (Draft, Available),
            (Available, Borrowed),
            (Available, Lost),
            (Borrowed, Available),
            (Borrowed, Lost),
            (Lost, Available),
        ];
        for from in BookState::ALL {
            for to in BookState::ALL {
                let id = module.create_book(create_dto("edge")).await?;
                let path: &[BookState] = match from {
                    Draft => &[],
                    Available => &[Available],
                    Borrowed => &[Available, Borrowed],
                    Lost => &[Available, Lost],
                };
                for state in path {
                    module
                        .change_book_state(ChangeBookStateDto { id, state: *state })
                        .await?;
                }
                let result = module
                    .change_book_state(ChangeBookStateDto { id, state: to })
                    .await;
                let book = module.get_book(GetBookDto { id }).await?.expect("exists");
                if edges.contains(&(from, to)) {
                    assert!(result.is_ok(), "{from} -> {to} should pass");
                    assert_eq!(book.state, to);
                } else {
                    let report = result.expect_err("illegal move must fail");
                    assert_eq!(
                        report.current_context(),
                        &KernelError::IllegalTransition { from, to }
                    );
                    assert_eq!(book.state, from);
                }
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn illegal_move_keeps_stored_state() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let id = module.create_book(create_dto("stuck")).await?;

        let report = module
            .make_borrowed(id)
            .await
            .expect_err("draft cannot be borrowed");
        assert_eq!(
            report.current_context(),
            &KernelError::IllegalTransition {
                from: BookState::Draft,
                to: BookState::Borrowed,
            }
        );
        let book = module.get_book(GetBookDto { id }).await?.expect("exists");
        assert_eq!(book.state, BookState::Draft);
        Ok(())
    }

    #[tokio::test]
    async fn state_change_of_missing_book_is_not_found() {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let report = module
            .make_available(Uuid::new_v4())
            .await
            .expect_err("no such book");
        assert_eq!(report.current_context(), &KernelError::NotFound);
    }

    #[tokio::test]
    async fn lending_scenario() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let book_id = module.create_book(create_dto("Solaris")).await?;
        module.make_available(book_id).await?;

        let member_id = module
            .create_member(CreateMemberDto {
                name: "Kris Kelvin".to_string(),
                email: None,
                image: None,
                member_since: None,
                membership_end: None,
                member_number: "M-0001".to_string(),
                date_of_birth: None,
            })
            .await?;
        let loan_id = module
            .create_loan(CreateLoanDto {
                member_id,
                book_id,
                start_date: Some(date!(2024 - 01 - 01)),
                end_date: Some(date!(2024 - 01 - 10)),
            })
            .await?;

        let book = module
            .get_book(GetBookDto { id: book_id })
            .await?
            .expect("exists");
        assert!(book.is_lent);
        assert_eq!(book.last_loan_end, Some(date!(2024 - 01 - 10)));
        assert_eq!(book.loans, vec![loan_id]);

        module.make_borrowed(book_id).await?;
        let report = module
            .change_book_state(ChangeBookStateDto {
                id: book_id,
                state: BookState::Draft,
            })
            .await
            .expect_err("borrowed cannot go back to draft");
        assert_eq!(
            report.current_context(),
            &KernelError::IllegalTransition {
                from: BookState::Borrowed,
                to: BookState::Draft,
            }
        );
        let book = module
            .get_book(GetBookDto { id: book_id })
            .await?
            .expect("exists");
        assert_eq!(book.state, BookState::Borrowed);

        module.clock().advance(Duration::days(6));
        let book = module
            .get_book(GetBookDto { id: book_id })
            .await?
            .expect("exists");
        assert!(!book.is_lent);
        assert!(book.last_loan_end.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_and_touch_stamp_clock_time() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let category = module
            .create_category(CreateCategoryDto {
                name: "Science Fiction".to_string(),
                description: None,
                parent_id: None,
                children: Vec::new(),
            })
            .await?;
        let id = module.create_book(create_dto("Draft title")).await?;

        module
            .update_book(UpdateBookDto {
                id,
                title: Some("Final title".to_string()),
                release_date: Some(Some(date!(1972 - 03 - 01))),
                category_id: Some(Some(category)),
                image: Some(Some(vec![1, 2, 3])),
                ..Default::default()
            })
            .await?;
        let book = module.get_book(GetBookDto { id }).await?.expect("exists");
        assert_eq!(book.title, "Final title");
        assert_eq!(book.release_date, Some(date!(1972 - 03 - 01)));
        assert_eq!(book.category_id, Some(category));
        assert_eq!(book.image, Some(vec![1, 2, 3]));
        assert_eq!(book.last_updated, Some(datetime!(2024-01-05 12:00 UTC)));

        module.clock().advance(Duration::hours(1));
        module.touch_book(TouchBookDto { id }).await?;
        let book = module.get_book(GetBookDto { id }).await?.expect("exists");
        assert_eq!(book.title, "Final title");
        assert_eq!(book.last_updated, Some(datetime!(2024-01-05 13:00 UTC)));
        Ok(())
    }

    #[tokio::test]
    async fn update_clears_optional_fields() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let category = module
            .create_category(CreateCategoryDto {
                name: "Classics".to_string(),
                description: None,
                parent_id: None,
                children: Vec::new(),
            })
            .await?;
        let id = module
            .create_book(CreateBookDto {
                release_date: Some(date!(1815 - 12 - 23)),
                category_id: Some(category),
                image: Some(vec![7]),
                ..create_dto("Emma")
            })
            .await?;

        module
            .update_book(UpdateBookDto {
                id,
                title: Some("Emma.".to_string()),
                ..Default::default()
            })
            .await?;
        let book = module.get_book(GetBookDto { id }).await?.expect("exists");
        assert_eq!(book.release_date, Some(date!(1815 - 12 - 23)));
        assert_eq!(book.category_id, Some(category));
        assert_eq!(book.image, Some(vec![7]));

        module
            .update_book(UpdateBookDto {
                id,
                release_date: Some(None),
                category_id: Some(None),
                image: Some(None),
                ..Default::default()
            })
            .await?;
        let book = module.get_book(GetBookDto { id }).await?.expect("exists");
        assert_eq!(book.title, "Emma.");
        assert!(book.release_date.is_none());
        assert!(book.category_id.is_none());
        assert!(book.image.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn search_ors_criteria_without_duplicates() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let sf = module
            .create_category(CreateCategoryDto {
                name: "Science Fiction".to_string(),
                description: None,
                parent_id: None,
                children: Vec::new(),
            })
            .await?;
        let dune = module
            .create_book(CreateBookDto {
                category_id: Some(sf),
                ..create_dto("Dune")
            })
            .await?;
        let messiah = module.create_book(create_dto("Dune Messiah")).await?;
        let emma = module.create_book(create_dto("Emma")).await?;

        let found = module
            .search_books(SearchBooksDto {
                criteria: vec![
                    BookCriteriaDto {
                        title: Some("dune".to_string()),
                        category: None,
                    },
                    BookCriteriaDto {
                        title: None,
                        category: Some("Science Fiction".to_string()),
                    },
                ],
            })
            .await?;
        let ids = found.iter().map(|book| book.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![dune, messiah]);

        let everything = module.search_books(SearchBooksDto::default()).await?;
        assert_eq!(everything.len(), 3);
        assert!(everything.iter().any(|book| book.id == emma));

        let found = module
            .search_books(SearchBooksDto {
                criteria: vec![
                    BookCriteriaDto {
                        title: Some("emma".to_string()),
                        category: None,
                    },
                    BookCriteriaDto {
                        title: Some("messiah".to_string()),
                        category: None,
                    },
                    BookCriteriaDto {
                        title: None,
                        category: Some("Science Fiction".to_string()),
                    },
                ],
            })
            .await?;
        let ids = found.iter().map(|book| book.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![dune, messiah, emma]);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_book_drops_its_loans() -> error_stack::Result<(), KernelError> {
        let module = module_at(datetime!(2024-01-05 12:00 UTC));
        let book_id = module.create_book(create_dto("Gone")).await?;
        let member_id = module
            .create_member(CreateMemberDto {
                name: "Reader".to_string(),
                email: None,
                image: None,
                member_since: None,
                membership_end: None,
                member_number: "M-0002".to_string(),
                date_of_birth: None,
            })
            .await?;
        let loan_id = module
            .create_loan(CreateLoanDto {
                member_id,
                book_id,
                start_date: None,
                end_date: None,
            })
            .await?;

        module.delete_book(DeleteBookDto { id: book_id }).await?;
        assert!(module.get_book(GetBookDto { id: book_id }).await?.is_none());
        assert!(module.get_loan(GetLoanDto { id: loan_id }).await?.is_none());
        Ok(())
    }
}
