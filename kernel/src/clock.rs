use time::{Date, OffsetDateTime};

pub trait Clock: 'static + Sync + Send {
    fn now(&self) -> OffsetDateTime;

    /// Loans expire by calendar day, so lending checks compare against this.
    fn today(&self) -> Date {
        self.now().date()
    }
}

pub trait DependOnClock: 'static + Sync + Send {
    type Clock: Clock;
    fn clock(&self) -> &Self::Clock;
}
