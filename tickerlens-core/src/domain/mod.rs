//! Domain types for tickerlens.

pub mod bar;
pub mod config;
pub mod forecast;
pub mod signal;

pub use bar::{closes, validate_series, OhlcvBar};
pub use config::{
    AnalysisConfig, AtrConfig, EmaConfig, ForecastConfig, IndicatorConfig, RiskConfig,
    VolatilityBandsConfig,
};
pub use forecast::{Direction, ForecastMetrics, ForecastModel, ForecastResult, ModelEvaluation};
pub use signal::{LevelKind, RiskMetrics, SignalKind, SupportResistance, TradingSignal, Trend};

/// Symbol type alias
pub type Symbol = String;
