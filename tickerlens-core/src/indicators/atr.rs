//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), defined
//! from the second bar on (the first has no previous close).
//! Seed: ATR[period] = SMA of the first `period` true ranges.
//! Smoothing: exponential with multiplier 2/(period+1), the same constant
//! the EMA uses — this system deliberately does not use Wilder's 1/period.

use crate::domain::OhlcvBar;

/// True ranges for bars `1..n`, length `n - 1`.
pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let high = w[1].high;
            let low = w[1].low;
            let prev_close = w[0].close;
            if high.is_nan() || low.is_nan() || prev_close.is_nan() {
                f64::NAN
            } else {
                (high - low)
                    .max((high - prev_close).abs())
                    .max((low - prev_close).abs())
            }
        })
        .collect()
}

/// ATR of the bar series, index-aligned with `bars`. NaN for indices below
/// `period`; a series without `period` true ranges is all-NaN. Empty input
/// or `period < 1` yields an empty vec.
pub fn compute(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    if bars.is_empty() || period < 1 {
        return Vec::new();
    }

    let n = bars.len();
    let tr = true_ranges(bars);
    let mut result = vec![f64::NAN; n];
    if tr.len() < period {
        return result;
    }

    // Seed: SMA of the first `period` true ranges. A NaN in the window
    // makes the seed NaN, which the recursion then carries forward.
    let seed = tr[..period].iter().sum::<f64>() / period as f64;
    result[period] = seed;

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in period + 1..n {
        let atr = (tr[i - 1] - prev) * multiplier + prev;
        result[i] = atr;
        prev = atr;
    }

    result
}
