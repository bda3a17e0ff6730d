use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::config::{DependOnLendingConfig, LendingConfig};
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::query::{
    DependOnBookQuery, DependOnCategoryQuery, DependOnContactQuery, DependOnLoanQuery,
    DependOnMemberQuery,
};
use kernel::interface::update::{
    DependOnBookModifier, DependOnCategoryModifier, DependOnContactModifier,
    DependOnLoanModifier, DependOnMemberModifier,
};
use kernel::KernelError;

use crate::clock::SystemClock;
use crate::config::lending_config_from_env;
use crate::database::{
    InMemoryBookRepository, InMemoryCategoryRepository, InMemoryContactRepository,
    InMemoryDatabase, InMemoryLoanRepository, InMemoryMemberRepository, PostgresBookRepository,
    PostgresCategoryRepository, PostgresContactRepository, PostgresDatabase,
    PostgresLoanRepository, PostgresMemberRepository,
};

/// Wires a database and its repositories into every `DependOn*` trait the services need.
macro_rules! impl_depend_on {
    (
        $module:ident,
        $database:ty,
        book: $book:ident,
        category: $category:ident,
        contact: $contact:ident,
        loan: $loan:ident,
        member: $member:ident $(,)?
    ) => {
        impl<C: Clock> DependOnDatabaseConnection for $module<C> {
            type DatabaseConnection = $database;
            fn database_connection(&self) -> &Self::DatabaseConnection {
                &self.database
            }
        }

        impl<C: Clock> DependOnClock for $module<C> {
            type Clock = C;
            fn clock(&self) -> &Self::Clock {
                &self.clock
            }
        }

        impl<C: Clock> DependOnLendingConfig for $module<C> {
            fn lending_config(&self) -> &LendingConfig {
                &self.lending_config
            }
        }

        impl<C: Clock> DependOnBookQuery for $module<C> {
            type BookQuery = $book;
            fn book_query(&self) -> &Self::BookQuery {
                &$book
            }
        }

        impl<C: Clock> DependOnBookModifier for $module<C> {
            type BookModifier = $book;
            fn book_modifier(&self) -> &Self::BookModifier {
                &$book
            }
        }

        impl<C: Clock> DependOnCategoryQuery for $module<C> {
            type CategoryQuery = $category;
            fn category_query(&self) -> &Self::CategoryQuery {
                &$category
            }
        }

        impl<C: Clock> DependOnCategoryModifier for $module<C> {
            type CategoryModifier = $category;
            fn category_modifier(&self) -> &Self::CategoryModifier {
                &$category
            }
        }

        impl<C: Clock> DependOnContactQuery for $module<C> {
            type ContactQuery = $contact;
            fn contact_query(&self) -> &Self::ContactQuery {
                &$contact
            }
        }

        impl<C: Clock> DependOnContactModifier for $module<C> {
            type ContactModifier = $contact;
            fn contact_modifier(&self) -> &Self::ContactModifier {
                &$contact
            }
        }

        impl<C: Clock> DependOnLoanQuery for $module<C> {
            type LoanQuery = $loan;
            fn loan_query(&self) -> &Self::LoanQuery {
                &$loan
            }
        }

        impl<C: Clock> DependOnLoanModifier for $module<C> {
            type LoanModifier = $loan;
            fn loan_modifier(&self) -> &Self::LoanModifier {
                &$loan
            }
        }

        impl<C: Clock> DependOnMemberQuery for $module<C> {
            type MemberQuery = $member;
            fn member_query(&self) -> &Self::MemberQuery {
                &$member
            }
        }

        impl<C: Clock> DependOnMemberModifier for $module<C> {
            type MemberModifier = $member;
            fn member_modifier(&self) -> &Self::MemberModifier {
                &$member
            }
        }
    };
}

#[derive(Clone)]
pub struct PostgresModule<C = SystemClock> {
    database: PostgresDatabase,
    clock: C,
    lending_config: LendingConfig,
}

impl PostgresModule {
    /// Connects using `POSTGRES_URL` and reads the lending settings from the environment.
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let database = PostgresDatabase::new().await?;
        let lending_config = lending_config_from_env()?;
        Ok(Self {
            database,
            clock: SystemClock,
            lending_config,
        })
    }
}

impl<C> PostgresModule<C> {
    pub fn database(&self) -> &PostgresDatabase {
        &self.database
    }

    pub fn with_clock<N: Clock>(self, clock: N) -> PostgresModule<N> {
        PostgresModule {
            database: self.database,
            clock,
            lending_config: self.lending_config,
        }
    }
}

impl_depend_on!(
    PostgresModule,
    PostgresDatabase,
    book: PostgresBookRepository,
    category: PostgresCategoryRepository,
    contact: PostgresContactRepository,
    loan: PostgresLoanRepository,
    member: PostgresMemberRepository,
);

#[derive(Clone, Default)]
pub struct InMemoryModule<C = SystemClock> {
    database: InMemoryDatabase,
    clock: C,
    lending_config: LendingConfig,
}

impl InMemoryModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C> InMemoryModule<C> {
    pub fn with_clock<N: Clock>(self, clock: N) -> InMemoryModule<N> {
        InMemoryModule {
            database: self.database,
            clock,
            lending_config: self.lending_config,
        }
    }

    pub fn with_lending_config(self, lending_config: LendingConfig) -> Self {
        Self {
            lending_config,
            ..self
        }
    }
}

impl_depend_on!(
    InMemoryModule,
    InMemoryDatabase,
    book: InMemoryBookRepository,
    category: InMemoryCategoryRepository,
    contact: InMemoryContactRepository,
    loan: InMemoryLoanRepository,
    member: InMemoryMemberRepository,
);
