use destructure::Mutation;
use time::Duration;
use vodca::References;

#[derive(Debug, Clone, References, Mutation)]
pub struct LendingConfig {
    loan_period: Duration,
}

impl LendingConfig {
    pub fn new(loan_period: Duration) -> Self {
        Self { loan_period }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            loan_period: Duration::days(6),
        }
    }
}

pub trait DependOnLendingConfig: 'static + Sync + Send {
    fn lending_config(&self) -> &LendingConfig;
}
