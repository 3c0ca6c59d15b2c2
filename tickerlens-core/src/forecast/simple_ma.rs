//! Baseline moving-average forecaster.
//!
//! Projects the recent per-bar trend forward with exponential decay so the
//! path flattens instead of extrapolating linearly. Bands come from the
//! empirical one-step error of a rolling moving average.

use crate::domain::{closes, ForecastModel, ForecastResult, OhlcvBar};
use crate::forecast::confidence::{confidence_multiplier, ma_standard_error};
use crate::forecast::{bias_from_trend, direction_from_trend, horizon_dates, Forecaster};

/// Moving-average window when the caller does not override it.
pub const DEFAULT_MA_PERIOD: usize = 20;

/// Per-step decay applied to the trend so the projection levels off.
const TREND_DECAY: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct SimpleMaForecaster {
    pub period: usize,
}

impl Default for SimpleMaForecaster {
    fn default() -> Self {
        Self {
            period: DEFAULT_MA_PERIOD,
        }
    }
}

impl Forecaster for SimpleMaForecaster {
    fn run(&self, bars: &[OhlcvBar], forecast_days: usize, confidence_level: f64) -> ForecastResult {
        let prices = closes(bars);
        let last = match prices.last() {
            Some(&p) => p,
            None => return ForecastResult::empty(ForecastModel::Simple, confidence_level),
        };
        let n = prices.len();

        let window = self.period.max(1).min(n);
        let trend = if n >= 2 {
            (last - prices[n - window]) / window as f64
        } else {
            0.0
        };

        let dates = horizon_dates(bars, forecast_days);
        let std_error = ma_standard_error(&prices, self.period, forecast_days);
        let multiplier = confidence_multiplier(confidence_level, n);

        let mut predicted = Vec::with_capacity(forecast_days);
        let mut lower = Vec::with_capacity(forecast_days);
        let mut upper = Vec::with_capacity(forecast_days);

        let trend_factor = if last > 0.0 { trend / last } else { 0.0 };
        let mut current = last;
        for i in 1..=forecast_days {
            current *= 1.0 + trend_factor * (-(i as f64) * TREND_DECAY).exp();
            let point = current.max(0.0);
            let margin = multiplier * std_error * (i as f64).sqrt();
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
            model: ForecastModel::Simple,
            metrics: None,
        }
    }
}
