//! Gated-memory forecaster.
//!
//! A deterministic stand-in for a learned sequence model, not a neural
//! network: fixed scalar forget/input/output gates run over a min-max
//! normalized trailing window. The forget/input pass folds the window into a
//! cell state (an exponentially weighted memory), and the forecast recursion
//! pulls the path toward that cell while a decaying drift term carries the
//! recent trend. A genuinely trained model can replace this behind the same
//! trait without touching callers.

use tracing::warn;

use crate::domain::{closes, ForecastModel, ForecastResult, OhlcvBar};
use crate::forecast::confidence::{confidence_multiplier, floored_volatility};
use crate::forecast::simple_ma::SimpleMaForecaster;
use crate::forecast::{
    bias_from_trend, direction_from_trend, horizon_dates, Forecaster, MIN_LONG_TERM_BARS,
};
use crate::preprocess::{denormalize, normalize};

/// How much of the cell state survives each bar.
const FORGET_GATE: f64 = 0.8;

/// How much of each new bar enters the cell. Complements the forget gate so
/// the cell stays inside the normalized range.
const INPUT_GATE: f64 = 0.2;

/// Scales the mean-reversion pull toward the cell state.
const OUTPUT_GATE: f64 = 0.5;

/// Base reversion rate before the output gate is applied.
const REVERSION_SCALE: f64 = 0.1;

/// Per-step decay on the drift term.
const DRIFT_DECAY: f64 = 0.05;

/// Trailing window fed through the gates.
const SEQUENCE_WINDOW: usize = 30;

/// Band widening relative to the other models; the gated path smooths
/// aggressively, so its point forecast deserves less trust.
const UNCERTAINTY_WIDENING: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct LstmForecaster;

impl Forecaster for LstmForecaster {
    fn run(&self, bars: &[OhlcvBar], forecast_days: usize, confidence_level: f64) -> ForecastResult {
        let prices = closes(bars);
        if prices.len() < MIN_LONG_TERM_BARS {
            warn!(
                bars = prices.len(),
                needed = MIN_LONG_TERM_BARS,
                "too few bars for lstm, using the moving-average baseline"
            );
            return SimpleMaForecaster::default().run(bars, forecast_days, confidence_level);
        }

        let window_start = prices.len().saturating_sub(SEQUENCE_WINDOW);
        let window = &prices[window_start..];
        let (norm, min, max) = normalize(window);

        // Forget/input pass: fold the window into the cell state.
        let mut cell = norm[0];
        for &v in &norm[1..] {
            cell = FORGET_GATE * cell + INPUT_GATE * v;
        }

        let steps = norm.len() as f64;
        let drift = (norm[norm.len() - 1] - norm[0]) / steps;
        let trend = (window[window.len() - 1] - window[0]) / steps;
        let last = prices[prices.len() - 1];

        let dates = horizon_dates(bars, forecast_days);
        let std_error = UNCERTAINTY_WIDENING * floored_volatility(&prices);
        let multiplier = confidence_multiplier(confidence_level, prices.len());

        let mut path = Vec::with_capacity(forecast_days);
        let mut current = norm[norm.len() - 1];
        for i in 1..=forecast_days {
            let pull = (cell - current) * OUTPUT_GATE * REVERSION_SCALE;
            let step_drift = drift * (-(i as f64) * DRIFT_DECAY).exp();
            current += pull + step_drift;
            path.push(current);
        }

        let mut predicted = Vec::with_capacity(forecast_days);
        let mut lower = Vec::with_capacity(forecast_days);
        let mut upper = Vec::with_capacity(forecast_days);
        for (i, level) in denormalize(&path, min, max).into_iter().enumerate() {
            let point = level.max(0.0);
            let margin = multiplier * std_error * ((i + 1) as f64).sqrt();
            predicted.push(point);
            lower.push((point - margin).max(0.0));
            upper.push(point + margin);
        }

        ForecastResult {
            dates,
            predicted,
            lower_bound: lower,
            upper_bound: upper,
            confidence: confidence_level,
            direction: direction_from_trend(trend),
            bias: bias_from_trend(trend, last),
            model: ForecastModel::Lstm,
            metrics: None,
        }
    }
}
