//! Forecast value types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Forecasting model selector.
///
/// `Simple` and `Arima` are the short-term pair; `Prophet` and `Lstm` the
/// long-term pair. All four are deterministic heuristics dispatched through
/// the `Forecaster` trait, so a genuinely trained model can replace any of
/// them without touching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastModel {
    Simple,
    Arima,
    Prophet,
    Lstm,
}

impl ForecastModel {
    /// Every model, in dispatch order.
    pub const ALL: [ForecastModel; 4] = [
        ForecastModel::Simple,
        ForecastModel::Arima,
        ForecastModel::Prophet,
        ForecastModel::Lstm,
    ];

    /// Stable label used in cache keys and report output.
    pub fn label(&self) -> &'static str {
        match self {
            ForecastModel::Simple => "simple",
            ForecastModel::Arima => "arima",
            ForecastModel::Prophet => "prophet",
            ForecastModel::Lstm => "lstm",
        }
    }

    /// Whether this model belongs to the short-term pair.
    pub fn is_short_term(&self) -> bool {
        matches!(self, ForecastModel::Simple | ForecastModel::Arima)
    }
}

impl fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Predicted price direction over the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

/// Optional in-sample accuracy metrics attached to a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub directional_accuracy: f64,
}

/// One forecast: future dates with predicted prices and a confidence band.
///
/// Invariants: `dates`, `predicted`, `lower_bound`, and `upper_bound` share
/// one length; `lower_bound[i] <= predicted[i] <= upper_bound[i]`;
/// `lower_bound[i] >= 0`. An empty result (all arrays zero-length) is the
/// degraded output for infeasible input, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub dates: Vec<NaiveDate>,
    pub predicted: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,

    /// Confidence level the band was built for (0-1).
    pub confidence: f64,

    pub direction: Direction,

    /// Trend strength normalized to price, clamped to [-1, 1].
    pub bias: f64,

    pub model: ForecastModel,
    pub metrics: Option<ForecastMetrics>,
}

impl ForecastResult {
    /// Degraded zero-length result for input too thin to forecast at all.
    pub fn empty(model: ForecastModel, confidence: f64) -> Self {
        Self {
            dates: Vec::new(),
            predicted: Vec::new(),
            lower_bound: Vec::new(),
            upper_bound: Vec::new(),
            confidence,
            direction: Direction::Neutral,
            bias: 0.0,
            model,
            metrics: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }

    pub fn horizon(&self) -> usize {
        self.predicted.len()
    }
}

/// Offline model-comparison scores from `forecast::eval::evaluate_model`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub rmse: f64,
    pub mae: f64,

    /// Fraction of direction labels that matched (0-1).
    pub directional_accuracy: f64,

    /// Simulated return from trading the predicted direction.
    pub cumulative_return: f64,
}
