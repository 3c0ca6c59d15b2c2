//! Full-pipeline integration: data source in, analysis report out.
//!
//! Tests:
//! 1. A CSV file on disk flows through `CsvSource` into a complete report.
//! 2. The deferred long-term pair arrives over the channel and lands in
//!    the shared cache.
//! 3. Series contract violations surface as typed errors.
//! 4. Config deserializes from an empty document to working defaults and
//!    rejects out-of-range values at the boundary.

use std::io::Write as _;

use chrono::{Duration, NaiveDate};
use tickerlens_core::data::{CsvSource, MarketDataSource, SyntheticSource};
use tickerlens_core::domain::{AnalysisConfig, ForecastConfig, ForecastModel, OhlcvBar};
use tickerlens_core::error::ComputationError;
use tickerlens_core::pipeline::Analyzer;

fn forecasting_config() -> AnalysisConfig {
    AnalysisConfig {
        forecast: ForecastConfig {
            enabled: true,
            model: ForecastModel::Simple,
            forecast_period: 5,
            confidence_level: 0.95,
        },
        ..AnalysisConfig::default()
    }
}

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
fn csv_file_flows_into_a_complete_report() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    for i in 0..30i64 {
        let date = base + Duration::days(i);
        let close = 100.0 + i as f64;
        let open = if i == 0 { close } else { close - 1.0 };
        let high = open.max(close) + 1.0;
        let low = open.min(close) - 1.0;
        writeln!(file, "{date},{open},{high},{low},{close},1000").unwrap();
    }
    file.flush().unwrap();

    let bars = CsvSource::new(file.path()).fetch("RAMP").unwrap();
    assert_eq!(bars.len(), 30);

    let analyzer = Analyzer::new();
    let report = analyzer.analyze("RAMP", &bars, &forecasting_config()).unwrap();

    assert_eq!(report.symbol, "RAMP");
    assert_eq!(report.indicators.ema.len(), 30);
    assert!(!report.indicators.ema[29].is_nan());
    assert!(report.risk.position_size > 0);
    assert_eq!(report.risk.entry_price, 129.0);

    assert_eq!(report.forecasts.len(), 2);
    for forecast in &report.forecasts {
        assert_eq!(forecast.horizon(), 5);
        assert_eq!(
            forecast.dates[0],
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()
        );
    }
}

#[test]
fn deferred_pair_lands_in_the_shared_cache() {
    let bars = SyntheticSource::new(13, 80).fetch("AAPL").unwrap();
    let analyzer = Analyzer::new();
    let config = forecasting_config();

    let receiver = analyzer.defer_long_term("AAPL", &bars, &config.forecast);
    let mut results: Vec<ForecastModel> = receiver.iter().map(|r| {
        assert_eq!(r.horizon(), 5);
        r.model
    }).collect();
    results.sort_by_key(|m| format!("{m:?}"));

    assert_eq!(results, vec![ForecastModel::Lstm, ForecastModel::Prophet]);
    assert_eq!(analyzer.cache().lock().unwrap().len(), 2);
}

#[test]
fn contract_violations_surface_as_typed_errors() {
    let analyzer = Analyzer::new();
    let config = AnalysisConfig::default();

    let err = analyzer.analyze("EMPTY", &[], &config).unwrap_err();
    assert!(matches!(err, ComputationError::EmptySeries));

    let mut duplicated = bars_from(&[100.0, 101.0, 102.0, 103.0]);
    duplicated[2].date = duplicated[1].date;
    let err = analyzer.analyze("DUP", &duplicated, &config).unwrap_err();
    assert!(matches!(err, ComputationError::DuplicateDate { .. }));

    let mut shuffled = bars_from(&[100.0, 101.0, 102.0, 103.0]);
    shuffled[2].date = shuffled[1].date - Duration::days(5);
    let err = analyzer.analyze("OOO", &shuffled, &config).unwrap_err();
    assert!(matches!(err, ComputationError::OutOfOrderSeries { .. }));

    let mut poisoned = bars_from(&[100.0, 101.0, 102.0, 103.0]);
    poisoned[1].close = f64::NAN;
    let err = analyzer.analyze("NAN", &poisoned, &config).unwrap_err();
    assert!(matches!(err, ComputationError::InvalidClose { .. }));
}

#[test]
fn config_defaults_deserialize_and_validate() {
    let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
    config.validate().unwrap();
    assert!(!config.forecast.enabled);
    assert_eq!(config.indicators.ema.period, 20);
    assert_eq!(config.indicators.atr.period, 14);
    assert_eq!(config.indicators.risk.account_size, 5_000.0);

    let mut bad = AnalysisConfig::default();
    bad.indicators.ema.period = 0;
    assert!(bad.validate().is_err());

    let mut bad = AnalysisConfig::default();
    bad.forecast.forecast_period = 91;
    assert!(bad.validate().is_err());
}
