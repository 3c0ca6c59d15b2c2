//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = (close[t] - EMA[t-1]) * multiplier + EMA[t-1]
//! Multiplier: 2 / (period + 1).
//! Seed: EMA[period-1] = SMA of the first `period` closes.

use crate::domain::OhlcvBar;

/// EMA of the close series. NaN for indices below `period - 1`; a series
/// shorter than `period` is all-NaN. Empty input or `period < 1` yields an
/// empty vec.
pub fn compute(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    if bars.is_empty() || period < 1 {
        return Vec::new();
    }

    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of first `period` closes
    let mut sum = 0.0;
    for bar in bars.iter().take(period) {
        if bar.close.is_nan() {
            return result; // NaN in seed window → nothing downstream is usable
        }
        sum += bar.close;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if bars[i].close.is_nan() {
            // NaN taints every subsequent value through the recursion
            return result;
        }
        let ema = (bars[i].close - prev) * multiplier + prev;
        result[i] = ema;
        prev = ema;
    }

    result
}
