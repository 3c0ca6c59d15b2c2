//! Autoregressive forecaster over a differenced series.
//!
//! The price series is differenced until it passes the stationarity
//! heuristic (at most twice), an AR model is fitted with a simplified
//! Yule-Walker approximation (lag-1 autocorrelation, higher lags decayed by
//! powers of 0.5), a residual-based moving-average term corrects the first
//! step, and the forecast is integrated back to price space by cumulative
//! summation anchored at the last real price.

use tracing::warn;

use crate::domain::{closes, ForecastModel, ForecastResult, OhlcvBar};
use crate::forecast::confidence::{confidence_multiplier, floored_volatility, MIN_ERROR_FRACTION};
use crate::forecast::simple_ma::SimpleMaForecaster;
use crate::forecast::{
    bias_from_trend, direction_from_trend, horizon_dates, Forecaster, MIN_FORECAST_BARS,
};
use crate::preprocess::make_stationary;

/// Differencing cap; beyond two differences the reconstruction error
/// dominates any stationarity gain.
const MAX_DIFFERENCES: u32 = 2;

/// Highest AR order the fit will use.
const MAX_AR_ORDER: usize = 5;

/// Coefficients are scaled down when their absolute sum exceeds this, which
/// keeps the recursion from diverging.
const STABILITY_LIMIT: f64 = 0.95;

/// Weight of the residual moving-average correction on the first step.
const MA_THETA: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ArimaForecaster;

struct ArFit {
    mean: f64,
    coeffs: Vec<f64>,
    ma_adjustment: f64,
    residual_std: Option<f64>,
}

impl Forecaster for ArimaForecaster {
    fn run(&self, bars: &[OhlcvBar], forecast_days: usize, confidence_level: f64) -> ForecastResult {
        let prices = closes(bars);
        if prices.len() < MIN_FORECAST_BARS {
            warn!(
                bars = prices.len(),
                needed = MIN_FORECAST_BARS,
                "too few bars for arima, using the moving-average baseline"
            );
            return SimpleMaForecaster::default().run(bars, forecast_days, confidence_level);
        }
        let last = prices[prices.len() - 1];

        let (stationary, differences) = make_stationary(&prices, MAX_DIFFERENCES);
        let fit = fit_ar(&stationary);

        let std_error = match fit.residual_std {
            Some(std) => std.max(last * MIN_ERROR_FRACTION),
            None => floored_volatility(&prices),
        };
        let multiplier = confidence_multiplier(confidence_level, prices.len());
        let dates = horizon_dates(bars, forecast_days);

        // Recursive forecast in the differenced space: each step feeds its
        // own output back in as the newest lag.
        let order = fit.coeffs.len();
        let centered: Vec<f64> = stationary.iter().map(|v| v - fit.mean).collect();
        let mut tail: Vec<f64> = centered[centered.len().saturating_sub(order)..]
            .iter()
            .rev()
            .copied()
            .collect();

        let mut station_forecast = Vec::with_capacity(forecast_days);
        for step in 1..=forecast_days {
            let mut next: f64 = fit
                .coeffs
                .iter()
                .zip(tail.iter())
                .map(|(c, y)| c * y)
                .sum();
            if step == 1 {
                next += fit.ma_adjustment;
            }
            tail.insert(0, next);
            tail.truncate(order);
            station_forecast.push(next + fit.mean);
        }

        let path = integrate(&station_forecast, &prices, differences);

        let mut predicted = Vec::with_capacity(forecast_days);
        let mut lower = Vec::with_capacity(forecast_days);
        let mut upper = Vec::with_capacity(forecast_days);
        for (i, &level) in path.iter().enumerate() {
            let point = level.max(0.0);
            let margin = multiplier * std_error * ((i + 1) as f64).sqrt();
            predicted.push(point);
            lower.push((point - margin).max(0.0));
            upper.push(point + margin);
        }

        // Average daily move implied by the forecast path.
        let trend = match predicted.last() {
            Some(&end) if forecast_days > 0 => (end - last) / forecast_days as f64,
            _ => 0.0,
        };

        ForecastResult {
            dates,
            predicted,
            lower_bound: lower,
            upper_bound: upper,
            confidence: confidence_level,
            direction: direction_from_trend(trend),
            bias: bias_from_trend(trend, last),
            model: ForecastModel::Arima,
            metrics: None,
        }
    }
}

/// Fit decayed AR coefficients plus a residual MA correction.
fn fit_ar(series: &[f64]) -> ArFit {
    let n = series.len();
    if n < 2 {
        return ArFit {
            mean: series.first().copied().unwrap_or(0.0),
            coeffs: Vec::new(),
            ma_adjustment: 0.0,
            residual_std: None,
        };
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = series.iter().map(|v| v - mean).collect();

    let denom: f64 = centered.iter().map(|y| y * y).sum();
    let numer: f64 = centered.windows(2).map(|w| w[0] * w[1]).sum();
    let r1 = if denom > 0.0 { numer / denom } else { 0.0 };

    let order = (n / 4).clamp(1, MAX_AR_ORDER);
    let mut coeffs: Vec<f64> = (0..order).map(|k| r1 * 0.5f64.powi(k as i32)).collect();
    let total: f64 = coeffs.iter().map(|c| c.abs()).sum();
    if total > STABILITY_LIMIT {
        let scale = STABILITY_LIMIT / total;
        for c in &mut coeffs {
            *c *= scale;
        }
    }

    // In-sample one-step residuals drive both the MA correction and the
    // band width.
    let mut residuals = Vec::with_capacity(n.saturating_sub(order));
    for t in order..n {
        let pred: f64 = coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c * centered[t - 1 - k])
            .sum();
        residuals.push(centered[t] - pred);
    }

    let (ma_adjustment, residual_std) = if residuals.is_empty() {
        (0.0, None)
    } else {
        let recent = &residuals[residuals.len().saturating_sub(order)..];
        let adjustment = MA_THETA * (recent.iter().sum::<f64>() / recent.len() as f64);

        let m = residuals.iter().sum::<f64>() / residuals.len() as f64;
        let variance =
            residuals.iter().map(|e| (e - m).powi(2)).sum::<f64>() / residuals.len() as f64;
        (adjustment, Some(variance.sqrt()))
    };

    ArFit {
        mean,
        coeffs,
        ma_adjustment,
        residual_std,
    }
}

/// Reverse the differencing: cumulative summation anchored at the last real
/// price (and, for a second difference, the last real price change).
fn integrate(forecast: &[f64], prices: &[f64], differences: u32) -> Vec<f64> {
    let n = prices.len();
    match differences {
        0 => forecast.to_vec(),
        1 => {
            let mut level = prices[n - 1];
            forecast
                .iter()
                .map(|&delta| {
                    level += delta;
                    level
                })
                .collect()
        }
        _ => {
            let mut slope = prices[n - 1] - prices[n - 2];
            let mut level = prices[n - 1];
            forecast
                .iter()
                .map(|&accel| {
                    slope += accel;
                    level += slope;
                    level
                })
                .collect()
        }
    }
}
