//! TickerLens Core — indicators, forecasting, signals, and risk for daily OHLCV series.
//!
//! This crate contains the analysis engine behind the TickerLens tools:
//! - Domain types (bars, configs, signals, forecasts) with boundary validation
//! - Price preprocessing (log returns, differencing, stationarity, scaling)
//! - Indicator engine (EMA, ATR, volatility bands) driven by explicit configs
//! - Four heuristic forecasters behind one `Forecaster` trait, plus an
//!   offline evaluation harness
//! - Rule-based trading signals with support/resistance and risk metrics
//! - A TTL'd, capacity-bounded forecast cache and the `Analyzer` pipeline
//!   that ties everything together
//!
//! The free functions re-exported here are the stable entry points; each is
//! pure and total over its documented input contract.

pub mod cache;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod pipeline;
pub mod preprocess;
pub mod signals;

pub use cache::ForecastCache;
pub use data::{CsvSource, MarketDataError, MarketDataSource, SyntheticSource};
pub use domain::{
    AnalysisConfig, ForecastConfig, ForecastModel, ForecastResult, IndicatorConfig, OhlcvBar,
    RiskMetrics, SupportResistance, TradingSignal,
};
pub use error::{ComputationError, ConfigError};
pub use forecast::{generate_forecast, generate_long_term_forecast, generate_short_term_forecast};
pub use indicators::{compute_all as compute_indicators, IndicatorSet};
pub use pipeline::{AnalysisReport, Analyzer};
pub use signals::{calculate_risk_metrics, detect_support_resistance, generate_signals};
