//! Volatility bands: rolling mean ± multiplier × standard deviation.
//!
//! Population standard deviation over a `period`-close window. Unlike
//! Bollinger's typical SMA centerline output, only the two band edges are
//! reported.

use crate::domain::OhlcvBar;

/// Upper and lower band series, index-aligned with the input bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bands {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bands over the close series. NaN for indices below `period - 1`; a
/// window containing NaN yields NaN edges at that index. Empty input or
/// `period < 1` yields empty vecs.
pub fn compute(bars: &[OhlcvBar], period: usize, multiplier: f64) -> Bands {
    if bars.is_empty() || period < 1 {
        return Bands::default();
    }

    let n = bars.len();
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        if window.iter().any(|b| b.close.is_nan()) {
            continue;
        }
        let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|b| (b.close - mean).powi(2))
            .sum::<f64>()
            / period as f64;
        let std_dev = variance.sqrt();

        upper[i] = mean + std_dev * multiplier;
        lower[i] = mean - std_dev * multiplier;
    }

    Bands { upper, lower }
}
