//! Shared confidence-interval machinery for the forecasting models.
//!
//! Every model builds its band the same way: estimate a standard error
//! (from in-sample one-step residuals where the model has them, otherwise
//! from trailing return volatility floored at 1% of the last price), scale
//! it by `sqrt(step)` so uncertainty grows with the horizon, and multiply by
//! a z/t quantile for the requested confidence level.

/// Trailing window used for the volatility fallback.
pub const VOLATILITY_WINDOW: usize = 30;

/// Standard-error floor as a fraction of the last price.
pub const MIN_ERROR_FRACTION: f64 = 0.01;

/// Below this sample size the t-approximation replaces the normal quantile.
const SMALL_SAMPLE: usize = 30;

/// Normal quantiles for two-sided confidence levels.
const Z_TABLE: &[(f64, f64)] = &[
    (0.50, 0.674),
    (0.68, 1.0),
    (0.80, 1.282),
    (0.90, 1.645),
    (0.95, 1.96),
    (0.99, 2.576),
];

/// t-approximation quantiles for small samples.
const T_TABLE: &[(f64, f64)] = &[
    (0.50, 0.683),
    (0.80, 1.310),
    (0.90, 1.699),
    (0.95, 2.045),
    (0.99, 2.756),
];

/// Interval multiplier for a confidence level, given the sample size the
/// error estimate came from.
///
/// Levels between table entries are linearly interpolated; levels outside
/// the table clamp to the nearest endpoint.
pub fn confidence_multiplier(confidence_level: f64, sample_size: usize) -> f64 {
    let table = if sample_size < SMALL_SAMPLE {
        T_TABLE
    } else {
        Z_TABLE
    };
    lookup(table, confidence_level)
}

fn lookup(table: &[(f64, f64)], level: f64) -> f64 {
    let (first_level, first_value) = table[0];
    if level <= first_level {
        return first_value;
    }
    let (last_level, last_value) = table[table.len() - 1];
    if level >= last_level {
        return last_value;
    }

    for pair in table.windows(2) {
        let (lo_level, lo_value) = pair[0];
        let (hi_level, hi_value) = pair[1];
        if level <= hi_level {
            let ratio = (level - lo_level) / (hi_level - lo_level);
            return lo_value + ratio * (hi_value - lo_value);
        }
    }

    last_value
}

/// Population standard deviation of simple returns.
///
/// Steps with a non-positive previous price are skipped. Fewer than two
/// usable prices yields 0.
pub fn return_volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Trailing-window volatility floored at 1% of the last price.
///
/// The fallback error estimate when a model has no residuals of its own.
pub fn floored_volatility(prices: &[f64]) -> f64 {
    let last = match prices.last() {
        Some(&p) => p,
        None => return 0.0,
    };
    let start = prices.len().saturating_sub(VOLATILITY_WINDOW);
    return_volatility(&prices[start..]).max(last * MIN_ERROR_FRACTION)
}

/// Empirical standard error of a moving-average forecast.
///
/// Collects in-sample one-step errors `|price[i+1] - ma(window ending at i)|`
/// over a rolling window, takes their population standard deviation, scales
/// by `sqrt(horizon)`, and floors the result at 1% of the last price. Falls
/// back to [`floored_volatility`] when the series is too short to produce
/// errors.
pub fn ma_standard_error(prices: &[f64], ma_period: usize, horizon: usize) -> f64 {
    if prices.len() < ma_period + 5 {
        return floored_volatility(prices);
    }

    let window = ma_period.min(prices.len() / 2);
    let mut errors = Vec::new();
    for i in window..prices.len() - 1 {
        let ma = prices[i - window..i].iter().sum::<f64>() / window as f64;
        errors.push((prices[i + 1] - ma).abs());
    }

    if errors.is_empty() {
        return floored_volatility(prices);
    }

    let n = errors.len() as f64;
    let mean = errors.iter().sum::<f64>() / n;
    let variance = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
    let std_error = variance.sqrt();

    let min_error = prices[prices.len() - 1] * MIN_ERROR_FRACTION;
    (std_error * (horizon as f64).sqrt()).max(min_error)
}
