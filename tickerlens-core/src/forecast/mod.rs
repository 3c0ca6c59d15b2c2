//! Forecast engine: four interchangeable models behind one trait.
//!
//! `Simple` and `Arima` form the short-term pair, `Prophet` and `Lstm` the
//! long-term pair. All four are deterministic heuristics that share date
//! generation ([`dates`]) and confidence-interval machinery
//! ([`confidence`]), degrade to the baseline on thin input, and never fail
//! for data-sufficiency reasons.

pub mod arima;
pub mod confidence;
pub mod dates;
pub mod eval;
pub mod lstm;
pub mod prophet;
pub mod simple_ma;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::domain::{Direction, ForecastConfig, ForecastModel, ForecastResult, OhlcvBar};

pub use arima::ArimaForecaster;
pub use eval::{compare_models, evaluate_model, score_on_holdout, HoldoutScore};
pub use lstm::LstmForecaster;
pub use prophet::ProphetForecaster;
pub use simple_ma::SimpleMaForecaster;

/// Fewer bars than this and no forecast is produced at all.
pub const MIN_FORECAST_BARS: usize = 10;

/// History the long-term pair wants before using its own machinery instead
/// of the baseline.
pub const MIN_LONG_TERM_BARS: usize = 20;

/// Horizon beyond which the short-term pair stops being a good fit.
const SHORT_TERM_MAX_DAYS: usize = 30;

/// Horizon below which the long-term pair stops being a good fit.
const LONG_TERM_MIN_DAYS: usize = 7;

/// The shared model contract: bars in, a [`ForecastResult`] out.
pub trait Forecaster {
    fn run(&self, bars: &[OhlcvBar], forecast_days: usize, confidence_level: f64)
        -> ForecastResult;
}

/// Boxed forecaster for a model tag.
pub fn forecaster_for(model: ForecastModel) -> Box<dyn Forecaster> {
    match model {
        ForecastModel::Simple => Box::new(SimpleMaForecaster::default()),
        ForecastModel::Arima => Box::new(ArimaForecaster),
        ForecastModel::Prophet => Box::new(ProphetForecaster),
        ForecastModel::Lstm => Box::new(LstmForecaster),
    }
}

/// Run one model over the bars.
pub fn run_model(
    model: ForecastModel,
    bars: &[OhlcvBar],
    forecast_days: usize,
    confidence_level: f64,
) -> ForecastResult {
    forecaster_for(model).run(bars, forecast_days, confidence_level)
}

/// Config-driven entry point. `None` when forecasting is disabled or the
/// series is below the minimum.
pub fn generate_forecast(bars: &[OhlcvBar], config: &ForecastConfig) -> Option<ForecastResult> {
    if !config.enabled || bars.len() < MIN_FORECAST_BARS {
        return None;
    }
    Some(run_model(
        config.model,
        bars,
        config.forecast_period as usize,
        config.confidence_level,
    ))
}

/// Short-horizon facade. `None` below the forecasting minimum.
pub fn generate_short_term_forecast(
    bars: &[OhlcvBar],
    model: ForecastModel,
    forecast_days: usize,
    confidence_level: f64,
) -> Option<ForecastResult> {
    generate_with_advisory(bars, model, forecast_days, confidence_level)
}

/// Long-horizon facade. `None` below the forecasting minimum.
pub fn generate_long_term_forecast(
    bars: &[OhlcvBar],
    model: ForecastModel,
    forecast_days: usize,
    confidence_level: f64,
) -> Option<ForecastResult> {
    generate_with_advisory(bars, model, forecast_days, confidence_level)
}

fn generate_with_advisory(
    bars: &[OhlcvBar],
    model: ForecastModel,
    forecast_days: usize,
    confidence_level: f64,
) -> Option<ForecastResult> {
    if bars.len() < MIN_FORECAST_BARS {
        return None;
    }
    horizon_advisory(model, forecast_days);
    Some(run_model(model, bars, forecast_days, confidence_level))
}

/// Warn when a model family is asked for a horizon outside its design
/// range. The forecast still runs.
fn horizon_advisory(model: ForecastModel, forecast_days: usize) {
    if model.is_short_term() && forecast_days > SHORT_TERM_MAX_DAYS {
        warn!(
            %model,
            forecast_days,
            "short-term model past {} days, consider prophet or lstm",
            SHORT_TERM_MAX_DAYS
        );
    } else if !model.is_short_term() && forecast_days < LONG_TERM_MIN_DAYS {
        warn!(
            %model,
            forecast_days,
            "long-term model under {} days, consider simple or arima",
            LONG_TERM_MIN_DAYS
        );
    }
}

/// Forecast dates for the series' horizon, anchored on the wall clock.
pub(crate) fn horizon_dates(bars: &[OhlcvBar], forecast_days: usize) -> Vec<NaiveDate> {
    match bars.last() {
        Some(bar) => dates::forecast_dates(bar.date, forecast_days, Utc::now().date_naive()),
        None => Vec::new(),
    }
}

pub(crate) fn direction_from_trend(trend: f64) -> Direction {
    if trend > 0.0 {
        Direction::Up
    } else if trend < 0.0 {
        Direction::Down
    } else {
        Direction::Neutral
    }
}

/// Trend as a percentage of price, clamped to [-1, 1].
pub(crate) fn bias_from_trend(trend: f64, last_price: f64) -> f64 {
    if last_price <= 0.0 || !trend.is_finite() {
        return 0.0;
    }
    (trend / last_price * 100.0).clamp(-1.0, 1.0)
}
