//! Signal engine: a single BUY/SELL decision for the most recent bar.
//!
//! Stateless over `(bars, indicators, config)`. BUY needs the price to cross
//! or hold above the EMA with the close above the lower volatility band; SELL
//! fires on any bearish trigger (EMA cross down with rising ATR, trailing-stop
//! reversal, death cross, or a close under both the EMA and the lower band).
//! Simultaneous BUY and SELL evidence resolves to SELL.
//!
//! Every emitted signal carries a stop and target with the realized risk
//! clamped to 1-2% of entry; candidates whose final reward:risk lands below 3
//! are dropped rather than flagged.

pub mod levels;
pub mod risk;

use tracing::debug;

use crate::domain::{IndicatorConfig, LevelKind, OhlcvBar, SignalKind, TradingSignal, Trend};
use crate::indicators::IndicatorSet;

pub use levels::{detect_support_resistance, detect_with_lookback};
pub use risk::calculate_risk_metrics;

/// Hard floor on reward:risk for an emitted signal.
pub(crate) const MIN_RISK_REWARD: f64 = 3.0;

/// Realized per-trade risk bounds as a fraction of entry.
const RISK_FLOOR: f64 = 0.01;
const RISK_CEILING: f64 = 0.02;

/// Stop and target fractions when no warm ATR is available.
const FALLBACK_STOP_FRACTION: f64 = 0.02;
const FALLBACK_TARGET_FRACTION: f64 = 0.06;

/// How close the close must sit to a support level to count as confluence.
const SUPPORT_PROXIMITY: f64 = 0.02;

const RATIO_TOLERANCE: f64 = 1e-9;

/// Series cell at `index`, treating warm-up NaN as absent.
fn cell(series: &[f64], index: usize) -> Option<f64> {
    series.get(index).copied().filter(|v| v.is_finite())
}

/// Evaluate the latest bar and emit at most one signal.
///
/// Triggers whose inputs are cold (disabled indicator, warm-up NaN, or no
/// previous bar) fail closed: they simply do not fire.
pub fn generate_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    config: &IndicatorConfig,
) -> Vec<TradingSignal> {
    let latest = match bars.last() {
        Some(bar) => bar,
        None => return Vec::new(),
    };
    let index = bars.len() - 1;
    let close = latest.close;
    if !close.is_finite() || close <= 0.0 {
        return Vec::new();
    }

    let ema = cell(&indicators.ema, index);
    let lower_band = cell(&indicators.lower_band, index);
    let atr = cell(&indicators.atr, index);

    let prev_bar = if index == 0 { None } else { Some(&bars[index - 1]) };
    let prev_ema = if index == 0 { None } else { cell(&indicators.ema, index - 1) };
    let prev_atr = if index == 0 { None } else { cell(&indicators.atr, index - 1) };

    let crossed_above = match (prev_bar, prev_ema, ema) {
        (Some(prev), Some(prev_ema), Some(ema)) => prev.close <= prev_ema && close > ema,
        _ => false,
    };
    let crossed_below = match (prev_bar, prev_ema, ema) {
        (Some(prev), Some(prev_ema), Some(ema)) => prev.close >= prev_ema && close < ema,
        _ => false,
    };
    let holds_above = matches!(ema, Some(e) if close > e);
    let rising_atr = matches!((atr, prev_atr), (Some(a), Some(p)) if a > p);

    // Trailing stop for an implied long, anchored on the previous bar's high.
    let trailing_reversal = match (prev_bar, atr) {
        (Some(prev), Some(atr)) => {
            close < prev.high - atr * config.risk.atr_stop_loss_multiplier
        }
        _ => false,
    };

    let above_lower_band = matches!(lower_band, Some(band) if close > band);
    let below_both = matches!((ema, lower_band), (Some(e), Some(band)) if close < e && close < band);

    let buy = (crossed_above || holds_above) && above_lower_band;

    let mut sell_reasons: Vec<String> = Vec::new();
    if crossed_below && rising_atr {
        sell_reasons.push("EMA cross below with rising ATR".to_string());
    }
    if trailing_reversal {
        sell_reasons.push("Trailing stop reversal".to_string());
    }
    if crossed_below {
        sell_reasons.push("Death cross".to_string());
    }
    if below_both {
        sell_reasons.push("Price below EMA and lower band".to_string());
    }
    let sell = !sell_reasons.is_empty();

    if !buy && !sell {
        return Vec::new();
    }

    // Conflicting evidence resolves bearish.
    let kind = if sell { SignalKind::Sell } else { SignalKind::Buy };

    let reason = match kind {
        SignalKind::Buy => {
            let mut parts = vec![if crossed_above {
                "EMA cross above".to_string()
            } else {
                "Price above EMA".to_string()
            }];
            parts.push("Above lower band".to_string());
            if let Some(level) = nearby_support(bars, close) {
                parts.push(format!("Near support {level:.2}"));
            }
            parts.join(" + ")
        }
        SignalKind::Sell => sell_reasons.join(" + "),
    };

    let (raw_risk, structural_reward) = match atr {
        Some(atr) if atr > 0.0 => {
            let distance = atr * config.risk.atr_stop_loss_multiplier;
            (distance, distance * MIN_RISK_REWARD)
        }
        _ => (close * FALLBACK_STOP_FRACTION, close * FALLBACK_TARGET_FRACTION),
    };

    // Widening the stop never conjures reward the structure did not offer, so
    // a low-volatility setup can still fail the ratio floor below.
    let risk = raw_risk.clamp(close * RISK_FLOOR, close * RISK_CEILING);
    let reward = structural_reward.min(MIN_RISK_REWARD * risk);
    let ratio = reward / risk;
    if ratio + RATIO_TOLERANCE < MIN_RISK_REWARD {
        debug!(date = %latest.date, ratio, "signal discarded below the reward:risk floor");
        return Vec::new();
    }

    let (stop_loss, target) = match kind {
        SignalKind::Buy => (close - risk, close + reward),
        SignalKind::Sell => (close + risk, close - reward),
    };
    let trend = match kind {
        SignalKind::Buy => Trend::Bullish,
        SignalKind::Sell => Trend::Bearish,
    };

    vec![TradingSignal {
        index,
        date: latest.date,
        kind,
        price: close,
        stop_loss,
        target,
        risk_reward_ratio: ratio,
        trend,
        reason,
    }]
}

/// Closest detected support within [`SUPPORT_PROXIMITY`] of the close.
fn nearby_support(bars: &[OhlcvBar], close: f64) -> Option<f64> {
    detect_support_resistance(bars)
        .into_iter()
        .filter(|l| l.kind == LevelKind::Support)
        .filter(|l| l.level > 0.0 && (close - l.level).abs() / l.level < SUPPORT_PROXIMITY)
        .min_by(|a, b| (close - a.level).abs().total_cmp(&(close - b.level).abs()))
        .map(|l| l.level)
}
