//! Indicator engine: EMA, ATR, volatility bands, and the assembled
//! `IndicatorSet`.
//!
//! All indicator series are index-aligned with the input bars and use NaN
//! for warm-up cells. The set is recomputed in full on every data or
//! configuration change — there is no incremental mutation path.

pub mod atr;
pub mod bands;
pub mod ema;

use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorConfig, OhlcvBar};

pub use bands::Bands;

/// Every indicator series the analytics layer consumes, plus the derived
/// stop-loss price and position size for the latest bar.
///
/// Disabled indicators are empty vecs. `stop_loss` is NaN everywhere except
/// the last index, which holds `last_close - atr * stop_multiplier` when ATR
/// is enabled and warm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ema: Vec<f64>,
    pub atr: Vec<f64>,
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
    pub stop_loss: Vec<f64>,
    pub position_size: u64,
}

impl IndicatorSet {
    /// Latest warm ATR value, if the series has one.
    pub fn latest_atr(&self) -> Option<f64> {
        self.atr.last().copied().filter(|v| !v.is_nan())
    }
}

/// Assemble the full indicator set per the enabled flags in `config`.
///
/// Empty input returns the zero-valued set. Malformed periods fall through
/// to the per-indicator guards, which return empty series rather than
/// panicking.
pub fn compute_all(bars: &[OhlcvBar], config: &IndicatorConfig) -> IndicatorSet {
    let mut set = IndicatorSet::default();
    if bars.is_empty() {
        return set;
    }

    if config.ema.enabled {
        set.ema = ema::compute(bars, config.ema.period as usize);
    }

    if config.atr.enabled {
        set.atr = atr::compute(bars, config.atr.period as usize);
    }

    if config.volatility_bands.enabled {
        let bands = bands::compute(
            bars,
            config.volatility_bands.period as usize,
            config.volatility_bands.multiplier,
        );
        set.upper_band = bands.upper;
        set.lower_band = bands.lower;
    }

    if config.atr.enabled && !set.atr.is_empty() {
        let n = bars.len();
        let latest_atr = set.atr[n - 1];
        let stop_distance = latest_atr * config.risk.atr_stop_loss_multiplier;

        // A cold ATR (NaN) flows into a NaN stop price, and the position
        // size guard below rejects it.
        set.stop_loss = vec![f64::NAN; n];
        set.stop_loss[n - 1] = bars[n - 1].close - stop_distance;

        if stop_distance > 0.0 {
            let risk_amount = config.risk.account_size * config.risk.risk_percentage / 100.0;
            set.position_size = (risk_amount / stop_distance).floor() as u64;
        }
    }

    set
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            OhlcvBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars with explicit (open, high, low, close) tuples for tests that
/// need control over the full range.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<OhlcvBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| OhlcvBar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorConfig;

    fn trending_bars() -> Vec<OhlcvBar> {
        make_bars(&[
            100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0, 109.0, 110.0, 111.0,
            112.0, 113.0, 114.0, 115.0, 116.0, 117.0, 118.0, 119.0,
        ])
    }

    fn small_config() -> IndicatorConfig {
        let mut config = IndicatorConfig::default();
        config.ema.period = 5;
        config.atr.period = 5;
        config.volatility_bands.period = 5;
        config
    }

    #[test]
    fn empty_input_returns_zero_valued_set() {
        let set = compute_all(&[], &IndicatorConfig::default());
        assert_eq!(set, IndicatorSet::default());
    }

    #[test]
    fn disabled_indicators_stay_empty() {
        let mut config = small_config();
        config.ema.enabled = false;
        config.atr.enabled = false;
        config.volatility_bands.enabled = false;
        let set = compute_all(&trending_bars(), &config);
        assert!(set.ema.is_empty());
        assert!(set.atr.is_empty());
        assert!(set.upper_band.is_empty());
        assert!(set.stop_loss.is_empty());
        assert_eq!(set.position_size, 0);
    }

    #[test]
    fn all_series_are_bar_aligned() {
        let bars = trending_bars();
        let set = compute_all(&bars, &small_config());
        assert_eq!(set.ema.len(), bars.len());
        assert_eq!(set.atr.len(), bars.len());
        assert_eq!(set.upper_band.len(), bars.len());
        assert_eq!(set.lower_band.len(), bars.len());
        assert_eq!(set.stop_loss.len(), bars.len());
    }

    #[test]
    fn stop_loss_set_only_on_latest_bar() {
        let bars = trending_bars();
        let config = small_config();
        let set = compute_all(&bars, &config);

        let n = bars.len();
        for v in &set.stop_loss[..n - 1] {
            assert!(v.is_nan());
        }
        let expected = bars[n - 1].close - set.atr[n - 1] * config.risk.atr_stop_loss_multiplier;
        assert_approx(set.stop_loss[n - 1], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn position_size_golden() {
        // On this steady ramp make_bars yields open=prev, close=prev+1,
        // high=close+1, low=open-1, so TR = high-low = 3 on every bar and
        // ATR = 3 exactly once warm.
        let bars = trending_bars();
        let mut config = small_config();
        config.risk.account_size = 5_000.0;
        config.risk.risk_percentage = 2.0;
        config.risk.atr_stop_loss_multiplier = 2.0;

        let set = compute_all(&bars, &config);
        assert_approx(set.atr[bars.len() - 1], 3.0, 1e-9);
        // risk_amount = 100, stop distance = 6 → floor(16.67)
        assert_eq!(set.position_size, 16);
    }

    #[test]
    fn cold_atr_leaves_position_size_zero() {
        // 4 bars < ATR period 5 → all-NaN ATR
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0]);
        let set = compute_all(&bars, &small_config());
        assert!(set.atr.iter().all(|v| v.is_nan()));
        assert!(set.stop_loss[3].is_nan());
        assert_eq!(set.position_size, 0);
    }

    #[test]
    fn latest_atr_accessor() {
        let set = compute_all(&trending_bars(), &small_config());
        assert!(set.latest_atr().is_some());

        let cold = compute_all(&make_bars(&[100.0, 101.0]), &small_config());
        assert_eq!(cold.latest_atr(), None);
    }
}
