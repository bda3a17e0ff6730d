use std::env::VarError;

use error_stack::{Report, ResultExt};
use kernel::interface::config::LendingConfig;
use kernel::KernelError;
use time::Duration;

static LOAN_PERIOD_DAYS: &str = "LOAN_PERIOD_DAYS";

/// Reads the lending configuration from the environment, falling back to defaults for unset keys.
pub fn lending_config_from_env() -> error_stack::Result<LendingConfig, KernelError> {
    match dotenvy::var(LOAN_PERIOD_DAYS) {
        Ok(raw) => parse_loan_period(&raw).map(LendingConfig::new),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(LendingConfig::default()),
        Err(error) => Err(Report::from(error)
            .change_context(KernelError::Internal)
            .attach_printable(format!("Failed to read env: {LOAN_PERIOD_DAYS}"))),
    }
}

fn parse_loan_period(raw: &str) -> error_stack::Result<Duration, KernelError> {
    let days = raw
        .trim()
        .parse::<i64>()
        .change_context_lazy(|| KernelError::Internal)
        .attach_printable_lazy(|| format!("{LOAN_PERIOD_DAYS} is not a number: {raw}"))?;
    if days < 0 {
        return Err(Report::new(KernelError::Internal)
            .attach_printable(format!("{LOAN_PERIOD_DAYS} must not be negative: {days}")));
    }
    Ok(Duration::days(days))
}
