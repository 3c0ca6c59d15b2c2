//! Trading signal and risk value types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

/// Market regime read at signal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// One discretionary trading signal for the most recent bar.
///
/// Emitted only when the realized risk:reward is at least 3 and the stop
/// distance sits inside 1-2% of entry. `reason` concatenates the triggers
/// that fired, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    /// Position of the evaluated bar in the input series.
    pub index: usize,
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward_ratio: f64,
    pub trend: Trend,
    pub reason: String,
}

/// Support or resistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A horizontal price level touched repeatedly by local extrema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub level: f64,
    pub kind: LevelKind,

    /// 1 (weak) to 5 (strong), derived from touch count.
    pub strength: u8,
    pub touches: u32,
}

/// Account-level risk snapshot for a prospective trade at the latest close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub account_size: f64,
    pub risk_percentage: f64,

    /// Currency amount at risk: `account_size * risk_percentage / 100`.
    pub risk_amount: f64,

    /// Whole units affordable at the stop distance; 0 when ATR is unavailable.
    pub position_size: u64,
    pub stop_loss_distance: f64,
    pub stop_loss_price: f64,
    pub entry_price: f64,
    pub target_price: f64,
    pub risk_reward_ratio: f64,

    /// Target at the 1:3 floor: `entry + 3 * stop_loss_distance`.
    pub recommended_target: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_kind_serde_is_screaming() {
        let json = serde_json::to_string(&SignalKind::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
        let back: SignalKind = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(back, SignalKind::Sell);
    }

    #[test]
    fn trend_serde_is_screaming() {
        let json = serde_json::to_string(&Trend::Bullish).unwrap();
        assert_eq!(json, "\"BULLISH\"");
    }

    #[test]
    fn level_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&LevelKind::Support).unwrap();
        assert_eq!(json, "\"support\"");
    }
}
