//! Series preprocessing for the forecasting models.
//!
//! Log returns, differencing, a stationarity heuristic, and min-max
//! scaling. Everything here is a pure function over `f64` slices.

/// Log returns `ln(p[i]/p[i-1])`, length `n-1`.
///
/// A non-positive previous price contributes 0.0 instead of poisoning the
/// series with NaN/inf.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] / w[0]).ln() } else { 0.0 })
        .collect()
}

/// First difference `v[i] - v[i-1]`, length `n-1`.
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Outcome of the stationarity heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationarityTest {
    pub stationary: bool,

    /// Indicative only: 0.05 when stationary, 0.5 when not, 1.0 for a
    /// series too short to test.
    pub p_value: f64,
}

/// Split-half mean-stability check, a stand-in for a true augmented
/// Dickey-Fuller test.
///
/// The series is stationary iff the means of its two halves differ by less
/// than half the overall standard deviation. Fewer than 10 points is
/// reported as non-stationary with p 1.0.
pub fn test_stationarity(series: &[f64]) -> StationarityTest {
    if series.len() < 10 {
        return StationarityTest {
            stationary: false,
            p_value: 1.0,
        };
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mid = series.len() / 2;
    let mean_first = series[..mid].iter().sum::<f64>() / mid as f64;
    let mean_second = series[mid..].iter().sum::<f64>() / (series.len() - mid) as f64;

    let stationary = (mean_first - mean_second).abs() < std_dev * 0.5;
    StationarityTest {
        stationary,
        p_value: if stationary { 0.05 } else { 0.5 },
    }
}

/// Difference up to `max_diffs` times, stopping early once the series
/// tests stationary. Returns the series and the number of differences
/// applied.
pub fn make_stationary(prices: &[f64], max_diffs: u32) -> (Vec<f64>, u32) {
    let mut current = prices.to_vec();
    let mut diffs = 0;

    for _ in 0..max_diffs {
        if test_stationarity(&current).stationary {
            break;
        }
        current = difference(&current);
        diffs += 1;
    }

    (current, diffs)
}

/// Min-max scale to [0, 1]. Returns `(scaled, min, max)`.
///
/// A constant series maps to all-0.5 so downstream math never divides by a
/// zero range.
pub fn normalize(values: &[f64]) -> (Vec<f64>, f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return (vec![0.5; values.len()], min, max);
    }

    let scaled = values.iter().map(|v| (v - min) / range).collect();
    (scaled, min, max)
}

/// Inverse of `normalize` for the given original min/max.
pub fn denormalize(scaled: &[f64], min: f64, max: f64) -> Vec<f64> {
    let range = max - min;
    scaled.iter().map(|v| v * range + min).collect()
}
