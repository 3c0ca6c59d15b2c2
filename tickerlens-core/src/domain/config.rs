//! Serializable analysis configuration.
//!
//! Every struct here is validated once, at the boundary where it enters the
//! system (`validate()`); the pipeline assumes validated config and never
//! re-checks ranges. Compute functions still tolerate nonsense (period 0)
//! by returning empty output, so an unvalidated config degrades instead of
//! panicking.

use serde::{Deserialize, Serialize};

use crate::domain::forecast::ForecastModel;
use crate::error::ConfigError;

/// EMA settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmaConfig {
    pub enabled: bool,
    pub period: u32,
}

/// ATR settings. `multiplier` scales ATR wherever a price offset is derived
/// from it (trailing levels, stop distance).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtrConfig {
    pub enabled: bool,
    pub period: u32,
    pub multiplier: f64,
}

/// Volatility band settings: channel at mean ± multiplier × stddev.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolatilityBandsConfig {
    pub enabled: bool,
    pub period: u32,
    pub multiplier: f64,
}

/// Account-level risk parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// Account equity in currency units.
    pub account_size: f64,

    /// Percent of account risked per trade (0-100).
    pub risk_percentage: f64,

    /// ATR multiple used for the stop-loss distance.
    pub atr_stop_loss_multiplier: f64,
}

/// Full indicator + risk configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    pub ema: EmaConfig,
    pub atr: AtrConfig,
    pub volatility_bands: VolatilityBandsConfig,
    pub risk: RiskConfig,
}

/// Forecast request configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    pub enabled: bool,
    pub model: ForecastModel,

    /// Days to forecast (1-90).
    pub forecast_period: u32,

    /// Confidence for the interval, e.g. 0.95 (0.5-0.99).
    pub confidence_level: f64,
}

/// Everything one analysis pass needs, shaped for a config file with
/// `[indicators.*]` and `[forecast]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub indicators: IndicatorConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.forecast.validate()
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema: EmaConfig {
                enabled: true,
                period: 20,
            },
            atr: AtrConfig {
                enabled: true,
                period: 14,
                multiplier: 2.0,
            },
            volatility_bands: VolatilityBandsConfig {
                enabled: true,
                period: 20,
                multiplier: 2.0,
            },
            risk: RiskConfig {
                account_size: 5_000.0,
                risk_percentage: 2.0,
                atr_stop_loss_multiplier: 2.0,
            },
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: ForecastModel::Simple,
            forecast_period: 7,
            confidence_level: 0.95,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("ema", self.ema.period)?;
        check_period("atr", self.atr.period)?;
        check_multiplier("atr", self.atr.multiplier)?;
        check_period("volatility_bands", self.volatility_bands.period)?;
        check_multiplier("volatility_bands", self.volatility_bands.multiplier)?;
        if self.risk.account_size < 0.0 || self.risk.account_size.is_nan() {
            return Err(ConfigError::NegativeAccountSize(self.risk.account_size));
        }
        if !(0.0..=100.0).contains(&self.risk.risk_percentage) {
            return Err(ConfigError::RiskPercentageOutOfRange(
                self.risk.risk_percentage,
            ));
        }
        check_multiplier("risk", self.risk.atr_stop_loss_multiplier)?;
        Ok(())
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=90).contains(&self.forecast_period) {
            return Err(ConfigError::ForecastPeriodOutOfRange(self.forecast_period));
        }
        if !(0.5..=0.99).contains(&self.confidence_level) {
            return Err(ConfigError::ConfidenceLevelOutOfRange(
                self.confidence_level,
            ));
        }
        Ok(())
    }
}

fn check_period(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if (1..=200).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::PeriodOutOfRange { field, value })
    }
}

fn check_multiplier(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.1..=10.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::MultiplierOutOfRange { field, value })
    }
}
