//! OHLCV bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ComputationError;

/// Daily OHLCV bar.
///
/// Produced by a market-data source (`data::MarketDataSource`), which is
/// responsible for dropping rows with unparseable or non-positive prices and
/// future-dated rows before the series reaches the analytics layer. The core
/// still re-checks numerics at each computation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high/low bracket open and close,
    /// positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Validate the series contract: non-empty, chronologically ascending,
/// deduplicated by date, positive closes.
///
/// A violation here is a collaborator bug, not a data-quality problem, so it
/// surfaces as an error instead of degrading.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), ComputationError> {
    if bars.is_empty() {
        return Err(ComputationError::EmptySeries);
    }
    for (i, bar) in bars.iter().enumerate() {
        if bar.close.is_nan() || bar.close <= 0.0 {
            return Err(ComputationError::InvalidClose { index: i });
        }
        if i > 0 {
            let prev = &bars[i - 1];
            if bar.date < prev.date {
                return Err(ComputationError::OutOfOrderSeries { index: i });
            }
            if bar.date == prev.date {
                return Err(ComputationError::DuplicateDate { date: bar.date });
            }
        }
    }
    Ok(())
}

/// Closes extracted as a plain series, the shape most of the pipeline wants.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: OhlcvBar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }

    #[test]
    fn validate_accepts_ascending_series() {
        let mut a = sample_bar();
        let mut b = sample_bar();
        b.date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        a.close = 100.0;
        b.close = 101.0;
        assert!(validate_series(&[a, b]).is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(matches!(
            validate_series(&[]),
            Err(ComputationError::EmptySeries)
        ));
    }

    #[test]
    fn validate_rejects_duplicate_date() {
        let a = sample_bar();
        let b = sample_bar();
        assert!(matches!(
            validate_series(&[a, b]),
            Err(ComputationError::DuplicateDate { .. })
        ));
    }

    #[test]
    fn validate_rejects_out_of_order() {
        let mut a = sample_bar();
        let b = sample_bar();
        a.date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let result = validate_series(&[a, b]);
        assert!(matches!(
            result,
            Err(ComputationError::OutOfOrderSeries { index: 1 })
        ));
    }

    #[test]
    fn validate_rejects_nonpositive_close() {
        let mut a = sample_bar();
        a.close = 0.0;
        assert!(matches!(
            validate_series(&[a]),
            Err(ComputationError::InvalidClose { index: 0 })
        ));
    }
}
