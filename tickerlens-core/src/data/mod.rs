//! Market data sources.
//!
//! The analysis pipeline is source-agnostic: anything implementing
//! [`MarketDataSource`] can feed it. Shipped sources cover CSV files on
//! disk and a seeded synthetic walk for offline evaluation.

pub mod csv;
pub mod provider;
pub mod synthetic;

pub use provider::{MarketDataError, MarketDataSource};
pub use self::csv::CsvSource;
pub use synthetic::SyntheticSource;
