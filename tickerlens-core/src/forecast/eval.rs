//! Offline model scoring.
//!
//! Compares a forecast against realized prices held out of the training
//! window. Used for model comparison, never by the live pipeline.

use crate::domain::{closes, Direction, ForecastModel, ForecastResult, ModelEvaluation, OhlcvBar};
use crate::forecast::{run_model, MIN_FORECAST_BARS};

/// Score predicted against actual prices and direction labels.
///
/// RMSE and MAE are standard. Directional accuracy is the fraction of
/// matching labels. The cumulative return simulates trading the predicted
/// direction: actual returns accumulate when both signs agree positively and
/// are charged when both are negative. Mismatched array lengths score as
/// infinitely wrong rather than panicking.
pub fn evaluate_model(
    actual: &[f64],
    predicted: &[f64],
    actual_directions: &[Direction],
    predicted_directions: &[Direction],
) -> ModelEvaluation {
    if actual.len() != predicted.len() {
        return ModelEvaluation {
            rmse: f64::INFINITY,
            mae: f64::INFINITY,
            directional_accuracy: 0.0,
            cumulative_return: 0.0,
        };
    }
    if actual.is_empty() {
        return ModelEvaluation {
            rmse: 0.0,
            mae: 0.0,
            directional_accuracy: 0.0,
            cumulative_return: 0.0,
        };
    }

    let n = actual.len() as f64;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;
    let mae = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let matches = actual_directions
        .iter()
        .zip(predicted_directions)
        .filter(|(a, p)| a == p)
        .count();
    let directional_accuracy = if actual_directions.is_empty() {
        0.0
    } else {
        matches as f64 / actual_directions.len() as f64
    };

    let mut cumulative_return = 0.0;
    for i in 1..actual.len() {
        if actual[i - 1] <= 0.0 || predicted[i - 1] <= 0.0 {
            continue;
        }
        let actual_return = (actual[i] - actual[i - 1]) / actual[i - 1];
        let predicted_return = (predicted[i] - predicted[i - 1]) / predicted[i - 1];
        if predicted_return > 0.0 && actual_return > 0.0 {
            cumulative_return += actual_return;
        } else if predicted_return < 0.0 && actual_return < 0.0 {
            cumulative_return -= actual_return.abs();
        }
    }

    ModelEvaluation {
        rmse: mse.sqrt(),
        mae,
        directional_accuracy,
        cumulative_return,
    }
}

/// One model's forecast and score over a holdout window.
#[derive(Debug, Clone)]
pub struct HoldoutScore {
    pub model: ForecastModel,
    pub forecast: ForecastResult,
    pub evaluation: ModelEvaluation,
}

/// Split bars into a training prefix and a holdout suffix of `holdout` bars.
pub fn holdout_split(bars: &[OhlcvBar], holdout: usize) -> Option<(&[OhlcvBar], &[OhlcvBar])> {
    if holdout == 0 || holdout >= bars.len() {
        return None;
    }
    let split = bars.len() - holdout;
    Some((&bars[..split], &bars[split..]))
}

/// Train on the prefix, forecast the holdout window, and score the result.
///
/// `None` when the split is impossible or the training prefix is below the
/// forecasting minimum.
pub fn score_on_holdout(
    model: ForecastModel,
    bars: &[OhlcvBar],
    holdout: usize,
    confidence_level: f64,
) -> Option<HoldoutScore> {
    let (train, test) = holdout_split(bars, holdout)?;
    if train.len() < MIN_FORECAST_BARS {
        return None;
    }

    let forecast = run_model(model, train, holdout, confidence_level);

    let actual = closes(test);
    let anchor = train[train.len() - 1].close;
    let actual_directions = direction_labels(anchor, &actual);
    let predicted_directions = direction_labels(anchor, &forecast.predicted);
    let evaluation = evaluate_model(
        &actual,
        &forecast.predicted,
        &actual_directions,
        &predicted_directions,
    );

    Some(HoldoutScore {
        model,
        forecast,
        evaluation,
    })
}

/// Score every model on the same holdout window.
pub fn compare_models(
    bars: &[OhlcvBar],
    holdout: usize,
    confidence_level: f64,
) -> Vec<HoldoutScore> {
    ForecastModel::ALL
        .iter()
        .filter_map(|&model| score_on_holdout(model, bars, holdout, confidence_level))
        .collect()
}

/// Step-over-step direction labels for a price path, starting from `anchor`.
fn direction_labels(anchor: f64, path: &[f64]) -> Vec<Direction> {
    let mut prev = anchor;
    path.iter()
        .map(|&p| {
            let label = if p > prev {
                Direction::Up
            } else if p < prev {
                Direction::Down
            } else {
                Direction::Neutral
            };
            prev = p;
            label
        })
        .collect()
}
