//! Deterministic synthetic market data.
//!
//! A seeded geometric random walk over weekdays, used by the offline
//! evaluation harness and benchmarks when no CSV history is at hand.
//! The same seed and symbol always reproduce the same series.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::OhlcvBar;

use super::provider::{MarketDataError, MarketDataSource};

const START_PRICE: f64 = 100.0;
const MAX_DAILY_MOVE: f64 = 0.03;
const MAX_WICK: f64 = 0.01;

/// Generates `bars` weekday bars per symbol from a fixed seed.
pub struct SyntheticSource {
    seed: u64,
    bars: usize,
}

impl SyntheticSource {
    pub fn new(seed: u64, bars: usize) -> Self {
        Self { seed, bars }
    }
}

impl MarketDataSource for SyntheticSource {
    fn fetch(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketDataError> {
        if self.bars == 0 {
            return Err(MarketDataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(generate_bars(symbol, self.seed, self.bars))
    }
}

/// Walk a price geometrically from a fixed start, one bar per weekday.
/// The stream is keyed on both the seed and the symbol so different
/// tickers get independent walks under the same seed.
fn generate_bars(symbol: &str, seed: u64, count: usize) -> Vec<OhlcvBar> {
    let mut hasher = DefaultHasher::new();
    symbol.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(seed ^ hasher.finish());

    let mut bars = Vec::with_capacity(count);
    let mut price = START_PRICE;
    let mut date = start_date();
    while bars.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let daily_return = rng.gen_range(-MAX_DAILY_MOVE..MAX_DAILY_MOVE);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..MAX_WICK));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..MAX_WICK));
            let volume = rng.gen_range(500_000.0..5_000_000.0);
            bars.push(OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        date += Duration::days(1);
    }
    bars
}

fn start_date() -> NaiveDate {
    // A Monday, so the first bar lands on a trading day.
    NaiveDate::from_ymd_opt(2020, 1, 6).unwrap_or_default()
}
