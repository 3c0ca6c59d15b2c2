//! Additive trend-plus-seasonality forecaster.
//!
//! Decomposes the series into a least-squares linear trend, a weekly
//! component (day-over-day change averaged by day of week of the actual bar
//! dates), and a sinusoidal monthly component once two full 30-day cycles of
//! history exist. All three terms decay exponentially over the horizon.

use std::f64::consts::TAU;

use chrono::Datelike;
use tracing::warn;

use crate::domain::{closes, ForecastModel, ForecastResult, OhlcvBar};
use crate::forecast::confidence::{confidence_multiplier, floored_volatility};
use crate::forecast::simple_ma::SimpleMaForecaster;
use crate::forecast::{
    bias_from_trend, direction_from_trend, horizon_dates, Forecaster, MIN_LONG_TERM_BARS,
};

/// Per-step decay applied to every component.
const COMPONENT_DECAY: f64 = 0.05;

/// Length of the monthly cycle in calendar days.
const MONTHLY_CYCLE: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProphetForecaster;

impl Forecaster for ProphetForecaster {
    fn run(&self, bars: &[OhlcvBar], forecast_days: usize, confidence_level: f64) -> ForecastResult {
        let prices = closes(bars);
        if prices.len() < MIN_LONG_TERM_BARS {
            warn!(
                bars = prices.len(),
                needed = MIN_LONG_TERM_BARS,
                "too few bars for prophet, using the moving-average baseline"
            );
            return SimpleMaForecaster::default().run(bars, forecast_days, confidence_level);
        }
        let last = prices[prices.len() - 1];

        let slope = least_squares_slope(&prices);
        let weekly = weekly_deltas(bars);
        // Zero until two full cycles of history exist.
        let monthly_amplitude = cycle_amplitude(&prices, MONTHLY_CYCLE);

        let dates = horizon_dates(bars, forecast_days);
        let volatility = floored_volatility(&prices);
        let multiplier = confidence_multiplier(confidence_level, prices.len());

        let mut predicted = Vec::with_capacity(forecast_days);
        let mut lower = Vec::with_capacity(forecast_days);
        let mut upper = Vec::with_capacity(forecast_days);

        let trend_factor = if last > 0.0 { slope / last } else { 0.0 };
        let mut current = last;
        for (step, date) in (1..=forecast_days).zip(dates.iter()) {
            let decay = (-(step as f64) * COMPONENT_DECAY).exp();
            let trend_component = current * trend_factor * decay;
            let weekly_component = weekly[date.weekday().num_days_from_monday() as usize] * decay;
            let monthly_component =
                monthly_amplitude * (TAU * step as f64 / MONTHLY_CYCLE as f64).sin() * decay;
            current += trend_component + weekly_component + monthly_component;

            let point = current.max(0.0);
            let margin = multiplier * volatility * (step as f64).sqrt();
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
            direction: direction_from_trend(slope),
            bias: bias_from_trend(slope, last),
            model: ForecastModel::Prophet,
            metrics: None,
        }
    }
}

/// Ordinary least-squares slope of price against bar index.
fn least_squares_slope(prices: &[f64]) -> f64 {
    let n = prices.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, &p) in prices.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += p;
        sum_xy += x * p;
        sum_x2 += x * x;
    }

    (nf * sum_xy - sum_x * sum_y) / (nf * sum_x2 - sum_x * sum_x)
}

/// Mean day-over-day close change per weekday, indexed Monday=0.
fn weekly_deltas(bars: &[OhlcvBar]) -> [f64; 7] {
    let mut sums = [0.0_f64; 7];
    let mut counts = [0u32; 7];
    for pair in bars.windows(2) {
        let idx = pair[1].date.weekday().num_days_from_monday() as usize;
        sums[idx] += pair[1].close - pair[0].close;
        counts[idx] += 1;
    }

    let mut means = [0.0_f64; 7];
    for i in 0..7 {
        if counts[i] > 0 {
            means[i] = sums[i] / counts[i] as f64;
        }
    }
    means
}

/// Average per-position day-over-day change across full cycles of `period`
/// bars. Zero when fewer than two cycles of data exist.
fn cycle_amplitude(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period * 2 {
        return 0.0;
    }

    let cycles = prices.len() / period;
    let mut seasonal_sum = 0.0;
    for i in 0..period {
        let mut cycle_sum = 0.0;
        for j in 0..cycles {
            let idx = j * period + i;
            if idx > 0 && idx < prices.len() {
                cycle_sum += prices[idx] - prices[idx - 1];
            }
        }
        seasonal_sum += cycle_sum / cycles as f64;
    }

    seasonal_sum / period as f64
}
