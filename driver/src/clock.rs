use std::sync::{Arc, RwLock};

use kernel::interface::clock::Clock;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<RwLock<OffsetDateTime>>);

impl ManualClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self(Arc::new(RwLock::new(now)))
    }

    pub fn set(&self, now: OffsetDateTime) {
        let mut guard = self
            .0
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = now;
    }

    pub fn advance(&self, by: Duration) {
        let now = self.now();
        self.set(now.saturating_add(by));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self
            .0
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::clock::Clock;
    use time::macros::{date, datetime};
    use time::Duration;

    use crate::clock::ManualClock;

    #[test]
    fn manual_clock_moves_on_demand() {
        let clock = ManualClock::new(datetime!(2024-01-05 12:00 UTC));
        let shared = clock.clone();
        assert_eq!(clock.today(), date!(2024 - 01 - 05));
        shared.advance(Duration::days(6));
        assert_eq!(clock.today(), date!(2024 - 01 - 11));
    }
}
