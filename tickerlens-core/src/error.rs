//! Structured error types for the analytics core.
//!
//! Almost nothing here is fatal: insufficient data degrades, bad numerics
//! skip or NaN the affected cell, and malformed indicator config yields
//! empty output. The variants below cover the two conditions that do fail
//! loud — a bar series violating the collaborator contract, and a config
//! rejected at the boundary.

use chrono::NaiveDate;
use thiserror::Error;

/// Collaborator contract violations in an input bar series.
///
/// The market-data layer promises an ascending, date-deduplicated series of
/// positive closes. Anything else reaching the pipeline is a bug upstream,
/// so these are surfaced instead of being silently repaired.
#[derive(Debug, Error)]
pub enum ComputationError {
    #[error("bar series is empty")]
    EmptySeries,

    #[error("bar series is not chronologically ascending at index {index}")]
    OutOfOrderSeries { index: usize },

    #[error("bar series contains duplicate date {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("bar series has NaN or non-positive close at index {index}")]
    InvalidClose { index: usize },
}

/// Boundary validation failures for configuration values.
///
/// Config is validated once, when it enters the system; the pipeline never
/// re-validates deep inside.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} period {value} outside 1..=200")]
    PeriodOutOfRange { field: &'static str, value: u32 },

    #[error("{field} multiplier {value} outside 0.1..=10.0")]
    MultiplierOutOfRange { field: &'static str, value: f64 },

    #[error("account size {0} is negative")]
    NegativeAccountSize(f64),

    #[error("risk percentage {0} outside 0..=100")]
    RiskPercentageOutOfRange(f64),

    #[error("forecast period {0} outside 1..=90 days")]
    ForecastPeriodOutOfRange(u32),

    #[error("confidence level {0} outside 0.5..=0.99")]
    ConfidenceLevelOutOfRange(f64),
}
