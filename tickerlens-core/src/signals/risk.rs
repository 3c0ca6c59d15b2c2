//! Account-level risk sizing for a prospective long at the latest close.

use crate::domain::{IndicatorConfig, OhlcvBar, RiskMetrics};
use crate::indicators::IndicatorSet;

use super::MIN_RISK_REWARD;

/// Position sizing and stop/target derivation from account risk settings.
///
/// `entry_price` defaults to the latest close and `target_price` to the 1:3
/// recommendation. The stop distance is the latest warm ATR scaled by the
/// configured multiplier; without one (ATR disabled or still warming up) the
/// distance is zero and the position size collapses to 0.
pub fn calculate_risk_metrics(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    config: &IndicatorConfig,
    entry_price: Option<f64>,
    target_price: Option<f64>,
) -> RiskMetrics {
    let entry = match entry_price {
        Some(price) => price,
        None => bars.last().map(|b| b.close).unwrap_or(0.0),
    };

    let risk_amount = config.risk.account_size * config.risk.risk_percentage / 100.0;

    let stop_distance = match indicators.latest_atr() {
        Some(atr) if config.atr.enabled => atr * config.risk.atr_stop_loss_multiplier,
        _ => 0.0,
    };

    let position_size = if stop_distance > 0.0 {
        (risk_amount / stop_distance).floor() as u64
    } else {
        0
    };

    let stop_loss_price = entry - stop_distance;
    let recommended_target = entry + MIN_RISK_REWARD * stop_distance;
    let target = target_price.unwrap_or(recommended_target);

    // For the long-side construction the risk per unit is the stop distance.
    let reward = (target - entry).abs();
    let risk_reward_ratio = if stop_distance > 0.0 {
        reward / stop_distance
    } else {
        0.0
    };

    RiskMetrics {
        account_size: config.risk.account_size,
        risk_percentage: config.risk.risk_percentage,
        risk_amount,
        position_size,
        stop_loss_distance: stop_distance,
        stop_loss_price,
        entry_price: entry,
        target_price: target,
        risk_reward_ratio,
        recommended_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_all, make_bars};

    fn ramp_bars() -> Vec<crate::domain::OhlcvBar> {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        make_bars(&closes)
    }

    fn config() -> IndicatorConfig {
        let mut config = IndicatorConfig::default();
        config.ema.period = 5;
        config.atr.period = 5;
        config.volatility_bands.period = 5;
        config.risk.account_size = 5_000.0;
        config.risk.risk_percentage = 2.0;
        config.risk.atr_stop_loss_multiplier = 2.0;
        config
    }

    #[test]
    fn warm_atr_golden_numbers() {
        // Steady ramp bars carry a 3-unit true range, so ATR = 3 once warm:
        // distance = 6, risk amount = 100, position = floor(100 / 6) = 16.
        let bars = ramp_bars();
        let config = config();
        let set = compute_all(&bars, &config);

        let metrics = calculate_risk_metrics(&bars, &set, &config, None, None);
        assert_approx(metrics.risk_amount, 100.0, 1e-9);
        assert_approx(metrics.stop_loss_distance, 6.0, 1e-9);
        assert_eq!(metrics.position_size, 16);
        assert_approx(metrics.entry_price, 119.0, 1e-9);
        assert_approx(metrics.stop_loss_price, 113.0, 1e-9);
        assert_approx(metrics.recommended_target, 137.0, 1e-9);
        assert_approx(metrics.target_price, 137.0, 1e-9);
        assert_approx(metrics.risk_reward_ratio, 3.0, 1e-9);
    }

    #[test]
    fn explicit_entry_and_target_override_the_defaults() {
        let bars = ramp_bars();
        let config = config();
        let set = compute_all(&bars, &config);

        let metrics = calculate_risk_metrics(&bars, &set, &config, Some(200.0), Some(230.0));
        assert_approx(metrics.entry_price, 200.0, 1e-9);
        assert_approx(metrics.stop_loss_price, 194.0, 1e-9);
        assert_approx(metrics.target_price, 230.0, 1e-9);
        // reward 30 over risk 6
        assert_approx(metrics.risk_reward_ratio, 5.0, 1e-9);
        // recommendation ignores the caller's target
        assert_approx(metrics.recommended_target, 218.0, 1e-9);
    }

    #[test]
    fn disabled_atr_zeroes_the_position() {
        let bars = ramp_bars();
        let mut config = config();
        config.atr.enabled = false;
        let set = compute_all(&bars, &config);

        let metrics = calculate_risk_metrics(&bars, &set, &config, None, None);
        assert_eq!(metrics.position_size, 0);
        assert_approx(metrics.stop_loss_distance, 0.0, 1e-12);
        assert_approx(metrics.stop_loss_price, 119.0, 1e-9);
        assert_approx(metrics.recommended_target, 119.0, 1e-9);
        assert_approx(metrics.risk_reward_ratio, 0.0, 1e-12);
    }

    #[test]
    fn cold_atr_behaves_like_disabled() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let config = config();
        let set = compute_all(&bars, &config);

        let metrics = calculate_risk_metrics(&bars, &set, &config, None, None);
        assert_eq!(metrics.position_size, 0);
        assert_approx(metrics.stop_loss_distance, 0.0, 1e-12);
    }

    #[test]
    fn empty_bars_fall_back_to_the_explicit_entry() {
        let config = config();
        let set = IndicatorSet::default();

        let metrics = calculate_risk_metrics(&[], &set, &config, Some(50.0), None);
        assert_approx(metrics.entry_price, 50.0, 1e-12);
        assert_approx(metrics.risk_amount, 100.0, 1e-9);
        assert_eq!(metrics.position_size, 0);
    }
}
