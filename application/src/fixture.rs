use time::OffsetDateTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use driver::clock::ManualClock;
use driver::module::InMemoryModule;
use kernel::KernelError;

use crate::service::CreateContactService;
use crate::transfer::CreateContactDto;

/// An empty in-memory library whose clock stands still at `now`.
pub(crate) fn module_at(now: OffsetDateTime) -> InMemoryModule<ManualClock> {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "application=debug,driver=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
    InMemoryModule::new().with_clock(ManualClock::new(now))
}

pub(crate) async fn seed_contact(
    module: &InMemoryModule<ManualClock>,
    name: &str,
) -> error_stack::Result<Uuid, KernelError> {
    module
        .create_contact(CreateContactDto {
            name: name.to_string(),
            email: None,
            image: None,
        })
        .await
}
