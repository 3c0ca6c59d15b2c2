//! Market data source trait and error types.
//!
//! A source promises an ascending, date-deduplicated series of positive
//! closes with no bars beyond tomorrow; `domain::bar::validate_series`
//! re-checks that contract at the pipeline boundary.

use thiserror::Error;

use crate::domain::OhlcvBar;

/// Anything that can produce a daily bar history for a symbol.
pub trait MarketDataSource {
    fn fetch(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketDataError>;
}

/// Failures from a market data source.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("data source I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable market data: {0}")]
    Parse(String),

    #[error("no usable bars for symbol '{symbol}'")]
    NoData { symbol: String },
}
