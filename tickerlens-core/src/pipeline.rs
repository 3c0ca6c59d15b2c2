//! Orchestration: one full analysis pass per data or configuration change.
//!
//! `Analyzer` validates the series contract once, then fans out to the pure
//! computations. Forecasts route through the shared cache: per model the
//! cache check happens before the computation and the insert after it, with
//! the mutex released while the model runs. The cheap pair (Simple, Arima)
//! runs synchronously inside `analyze`; the expensive pair (Prophet, Lstm)
//! goes through `defer_long_term`, which pushes the work onto the rayon
//! pool and hands back a channel so the caller never blocks on it.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::cache::{CacheKey, ForecastCache};
use crate::domain::{
    validate_series, AnalysisConfig, ForecastConfig, ForecastModel, ForecastResult, OhlcvBar,
    RiskMetrics, SupportResistance, TradingSignal,
};
use crate::error::ComputationError;
use crate::forecast::{run_model, MIN_FORECAST_BARS};
use crate::indicators::{self, IndicatorSet};
use crate::signals::{calculate_risk_metrics, detect_support_resistance, generate_signals};

/// Output of one analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub symbol: String,
    pub indicators: IndicatorSet,
    pub signals: Vec<TradingSignal>,
    pub levels: Vec<SupportResistance>,
    pub risk: RiskMetrics,

    /// Forecasts produced by this pass, cheap pair first. Empty when
    /// forecasting is disabled or the series is below the minimum.
    pub forecasts: Vec<ForecastResult>,
}

impl AnalysisReport {
    pub fn forecast_for(&self, model: ForecastModel) -> Option<&ForecastResult> {
        self.forecasts.iter().find(|f| f.model == model)
    }
}

/// Stateless orchestrator around the one piece of shared state, the
/// forecast cache.
#[derive(Clone)]
pub struct Analyzer {
    cache: Arc<Mutex<ForecastCache>>,
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            cache: Arc::new(Mutex::new(ForecastCache::new())),
        }
    }

    pub fn with_cache(cache: Arc<Mutex<ForecastCache>>) -> Self {
        Analyzer { cache }
    }

    /// Handle to the shared cache.
    pub fn cache(&self) -> Arc<Mutex<ForecastCache>> {
        Arc::clone(&self.cache)
    }

    /// Drop every cached forecast for `symbol`; call on active-symbol
    /// change to keep stale cross-symbol entries from lingering.
    pub fn evict_symbol(&self, symbol: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.evict_symbol(symbol);
        }
    }

    /// Synchronous pass: indicators, signals, levels, risk metrics, and the
    /// short-term forecast pair.
    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[OhlcvBar],
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, ComputationError> {
        validate_series(bars)?;
        debug!(symbol, bars = bars.len(), "analysis pass");

        let indicators = indicators::compute_all(bars, &config.indicators);
        let signals = generate_signals(bars, &indicators, &config.indicators);
        let levels = detect_support_resistance(bars);
        let risk = calculate_risk_metrics(bars, &indicators, &config.indicators, None, None);

        let mut forecasts = Vec::new();
        if config.forecast.enabled && bars.len() >= MIN_FORECAST_BARS {
            let days = config.forecast.forecast_period as usize;
            let confidence = config.forecast.confidence_level;
            for model in [ForecastModel::Simple, ForecastModel::Arima] {
                forecasts.push(cached_forecast(
                    &self.cache,
                    symbol,
                    bars,
                    model,
                    days,
                    confidence,
                ));
            }
        }

        Ok(AnalysisReport {
            symbol: symbol.to_string(),
            indicators,
            signals,
            levels,
            risk,
            forecasts,
        })
    }

    /// Queue the expensive pair on the rayon pool. Results arrive on the
    /// returned channel as each model finishes; the channel closes after
    /// both. Disabled or too-thin input returns an already-closed channel.
    pub fn defer_long_term(
        &self,
        symbol: &str,
        bars: &[OhlcvBar],
        config: &ForecastConfig,
    ) -> Receiver<ForecastResult> {
        let (sender, receiver) = mpsc::channel();
        if !config.enabled || bars.len() < MIN_FORECAST_BARS {
            return receiver;
        }

        let cache = Arc::clone(&self.cache);
        let symbol = symbol.to_string();
        let bars = bars.to_vec();
        let days = config.forecast_period as usize;
        let confidence = config.confidence_level;

        rayon::spawn(move || {
            for model in [ForecastModel::Prophet, ForecastModel::Lstm] {
                let result = cached_forecast(&cache, &symbol, &bars, model, days, confidence);
                if sender.send(result).is_err() {
                    // Receiver gone, nothing left to deliver.
                    return;
                }
            }
        });

        receiver
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache check, then compute unlocked, then insert.
///
/// A poisoned mutex skips the cache on both sides rather than propagating
/// the panic; the forecast itself still runs.
fn cached_forecast(
    cache: &Mutex<ForecastCache>,
    symbol: &str,
    bars: &[OhlcvBar],
    model: ForecastModel,
    forecast_days: usize,
    confidence_level: f64,
) -> ForecastResult {
    let key = CacheKey::new(model, symbol, forecast_days, confidence_level, bars);

    if let Ok(mut cache) = cache.lock() {
        if let Some(hit) = cache.get(&key) {
            return hit;
        }
    }

    let result = run_model(model, bars, forecast_days, confidence_level);

    if let Ok(mut cache) = cache.lock() {
        cache.insert(key, result.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn ramp_bars(n: usize) -> Vec<OhlcvBar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_bars(&closes)
    }

    fn enabled_config() -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.forecast.enabled = true;
        config.forecast.forecast_period = 5;
        config
    }

    #[test]
    fn rejects_contract_violations() {
        let analyzer = Analyzer::new();
        let config = AnalysisConfig::default();

        let err = analyzer.analyze("TEST", &[], &config).unwrap_err();
        assert!(matches!(err, ComputationError::EmptySeries));

        let mut bars = ramp_bars(5);
        bars[2].date = bars[1].date;
        let err = analyzer.analyze("TEST", &bars, &config).unwrap_err();
        assert!(matches!(err, ComputationError::DuplicateDate { .. }));
    }

    #[test]
    fn full_pass_produces_every_section() {
        let analyzer = Analyzer::new();
        let bars = ramp_bars(60);

        let report = analyzer.analyze("TEST", &bars, &enabled_config()).unwrap();
        assert_eq!(report.symbol, "TEST");
        assert_eq!(report.indicators.ema.len(), 60);
        assert!(report.risk.position_size > 0);
        // A monotone ramp has no interior extrema.
        assert!(report.levels.is_empty());

        assert_eq!(report.forecasts.len(), 2);
        let simple = report.forecast_for(ForecastModel::Simple).unwrap();
        let arima = report.forecast_for(ForecastModel::Arima).unwrap();
        assert_eq!(simple.horizon(), 5);
        assert_eq!(arima.horizon(), 5);
    }

    #[test]
    fn disabled_forecasting_produces_none() {
        let analyzer = Analyzer::new();
        let bars = ramp_bars(30);

        let report = analyzer
            .analyze("TEST", &bars, &AnalysisConfig::default())
            .unwrap();
        assert!(report.forecasts.is_empty());
        assert!(analyzer.cache().lock().unwrap().is_empty());
    }

    #[test]
    fn second_pass_is_served_from_the_cache() {
        let analyzer = Analyzer::new();
        let bars = ramp_bars(30);
        let config = enabled_config();

        // Seed a sentinel under the exact key the pipeline will build; the
        // pass must return it instead of recomputing.
        let key = CacheKey::new(ForecastModel::Simple, "TEST", 5, 0.95, &bars);
        analyzer
            .cache()
            .lock()
            .unwrap()
            .insert(key, ForecastResult::empty(ForecastModel::Simple, 0.95));

        let report = analyzer.analyze("TEST", &bars, &config).unwrap();
        assert!(report.forecast_for(ForecastModel::Simple).unwrap().is_empty());
        assert!(!report.forecast_for(ForecastModel::Arima).unwrap().is_empty());
        assert_eq!(analyzer.cache().lock().unwrap().len(), 2);
    }

    #[test]
    fn deferred_pair_arrives_on_the_channel() {
        let analyzer = Analyzer::new();
        let bars = ramp_bars(40);
        let mut config = ForecastConfig::default();
        config.enabled = true;
        config.forecast_period = 5;

        let receiver = analyzer.defer_long_term("TEST", &bars, &config);
        let results: Vec<ForecastResult> = receiver.iter().collect();

        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|r| r.model == ForecastModel::Prophet));
        assert!(results.iter().any(|r| r.model == ForecastModel::Lstm));
        for result in &results {
            assert_eq!(result.horizon(), 5);
        }
        assert_eq!(analyzer.cache().lock().unwrap().len(), 2);
    }

    #[test]
    fn deferred_channel_closes_immediately_when_disabled() {
        let analyzer = Analyzer::new();
        let bars = ramp_bars(40);

        let receiver = analyzer.defer_long_term("TEST", &bars, &ForecastConfig::default());
        assert!(receiver.iter().next().is_none());
    }

    #[test]
    fn symbol_eviction_clears_only_that_symbol() {
        let analyzer = Analyzer::new();
        let bars = ramp_bars(30);
        let config = enabled_config();

        analyzer.analyze("AAPL", &bars, &config).unwrap();
        analyzer.analyze("BTC-USD", &bars, &config).unwrap();
        assert_eq!(analyzer.cache().lock().unwrap().len(), 4);

        analyzer.evict_symbol("AAPL");
        assert_eq!(analyzer.cache().lock().unwrap().len(), 2);
    }
}
