//! Integration tests for the forecast engine's shared contract.
//!
//! Tests:
//! 1. Golden Simple-MA scenario on a clean 30-bar ramp.
//! 2. Every model fills the requested horizon with aligned, date-anchored
//!    arrays at several horizons.
//! 3. Bounds stay ordered and non-negative even on a falling tape.
//! 4. Facades gate on the 10-bar minimum and degrade instead of failing.
//! 5. The holdout harness scores all four models on the same window.

use chrono::{Duration, NaiveDate};
use tickerlens_core::data::{MarketDataSource, SyntheticSource};
use tickerlens_core::domain::{Direction, ForecastModel, OhlcvBar};
use tickerlens_core::forecast::{compare_models, run_model};
use tickerlens_core::{generate_long_term_forecast, generate_short_term_forecast};

fn bars_from(closes: &[f64]) -> Vec<OhlcvBar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            OhlcvBar {
                date: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1_000.0,
            }
        })
        .collect()
}

#[test]
fn simple_ma_rides_a_clean_ramp_upward() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let bars = bars_from(&closes);

    let result = run_model(ForecastModel::Simple, &bars, 5, 0.95);

    assert_eq!(result.direction, Direction::Up);
    assert!(result.predicted[0] > 129.0);
    assert!(result.lower_bound[4] <= result.predicted[4]);
    assert!(result.predicted[4] <= result.upper_bound[4]);
    assert_eq!(result.confidence, 0.95);
}

#[test]
fn every_model_fills_its_horizon() {
    let bars = SyntheticSource::new(17, 50).fetch("HORIZON").unwrap();
    let last_date = bars.last().unwrap().date;

    for model in ForecastModel::ALL {
        for days in [1usize, 7, 30] {
            let result = run_model(model, &bars, days, 0.9);
            assert_eq!(result.model, model);
            assert_eq!(result.horizon(), days);
            assert_eq!(result.dates.len(), days);
            assert_eq!(result.lower_bound.len(), days);
            assert_eq!(result.upper_bound.len(), days);

            assert_eq!(result.dates[0], last_date + Duration::days(1));
            for pair in result.dates.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }
}

#[test]
fn bounds_stay_ordered_on_a_falling_tape() {
    let closes: Vec<f64> = (0..40).map(|i| 50.0 - i as f64 * 0.9).collect();
    let bars = bars_from(&closes);

    for model in ForecastModel::ALL {
        let result = run_model(model, &bars, 10, 0.95);
        for i in 0..result.horizon() {
            assert!(result.lower_bound[i] >= 0.0, "{model:?} step {i}");
            assert!(result.lower_bound[i] <= result.predicted[i] + 1e-9);
            assert!(result.predicted[i] <= result.upper_bound[i] + 1e-9);
        }
    }
}

#[test]
fn facades_gate_on_the_history_minimum() {
    let thin = bars_from(&vec![100.0; 9]);
    assert!(generate_short_term_forecast(&thin, ForecastModel::Simple, 5, 0.95).is_none());
    assert!(generate_long_term_forecast(&thin, ForecastModel::Prophet, 14, 0.95).is_none());

    let enough = bars_from(&vec![100.0; 10]);
    let short = generate_short_term_forecast(&enough, ForecastModel::Arima, 5, 0.95).unwrap();
    assert_eq!(short.horizon(), 5);
    let long = generate_long_term_forecast(&enough, ForecastModel::Lstm, 14, 0.95).unwrap();
    assert_eq!(long.horizon(), 14);
}

#[test]
fn holdout_harness_scores_every_model() {
    let bars = SyntheticSource::new(5, 70).fetch("EVAL").unwrap();
    let scores = compare_models(&bars, 10, 0.95);

    assert_eq!(scores.len(), 4);
    let mut seen: Vec<ForecastModel> = scores.iter().map(|s| s.model).collect();
    seen.dedup();
    assert_eq!(seen.len(), 4);

    for score in &scores {
        assert_eq!(score.forecast.horizon(), 10);
        assert!(score.evaluation.rmse.is_finite());
        assert!(score.evaluation.rmse >= 0.0);
        assert!(score.evaluation.mae <= score.evaluation.rmse + 1e-9);
        assert!((0.0..=1.0).contains(&score.evaluation.directional_accuracy));
    }
}
