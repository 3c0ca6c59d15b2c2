//! Support and resistance detection from local price extrema.
//!
//! A bar is a candidate level when its high (or low) is the extremum of a
//! window extending `lookback` bars to either side. Candidates of the same
//! kind within 2% of a group's first member merge into one level whose price
//! is the group mean and whose strength grows with touch count.

use crate::domain::{LevelKind, OhlcvBar, SupportResistance};

/// Window half-width used by [`detect_support_resistance`].
pub const DEFAULT_LOOKBACK: usize = 20;

/// Relative price tolerance for merging nearby candidates.
const GROUP_TOLERANCE: f64 = 0.02;

const MAX_STRENGTH: u32 = 5;

struct LevelGroup {
    kind: LevelKind,
    prices: Vec<f64>,
}

/// Detect support/resistance levels with the default ±20-bar window.
pub fn detect_support_resistance(bars: &[OhlcvBar]) -> Vec<SupportResistance> {
    detect_with_lookback(bars, DEFAULT_LOOKBACK)
}

/// Detect support/resistance levels with an explicit window half-width.
///
/// Returns an empty vec when the series is shorter than `2 * lookback + 1`
/// bars, since no bar then has a full window on both sides.
pub fn detect_with_lookback(bars: &[OhlcvBar], lookback: usize) -> Vec<SupportResistance> {
    if lookback == 0 || bars.len() < 2 * lookback + 1 {
        return Vec::new();
    }

    let mut candidates: Vec<(f64, LevelKind)> = Vec::new();
    for i in lookback..bars.len() - lookback {
        let window = &bars[i - lookback..i + lookback];
        let high = bars[i].high;
        let low = bars[i].low;

        if window.iter().all(|b| b.high <= high) {
            candidates.push((high, LevelKind::Resistance));
        }
        if window.iter().all(|b| b.low >= low) {
            candidates.push((low, LevelKind::Support));
        }
    }

    // The first candidate of a group anchors its tolerance band.
    let mut groups: Vec<LevelGroup> = Vec::new();
    for (price, kind) in candidates {
        let slot = groups
            .iter_mut()
            .find(|g| g.kind == kind && (price - g.prices[0]).abs() / g.prices[0] < GROUP_TOLERANCE);
        match slot {
            Some(group) => group.prices.push(price),
            None => groups.push(LevelGroup {
                kind,
                prices: vec![price],
            }),
        }
    }

    let mut levels: Vec<SupportResistance> = groups
        .into_iter()
        .map(|group| {
            let touches = group.prices.len() as u32;
            SupportResistance {
                level: group.prices.iter().sum::<f64>() / group.prices.len() as f64,
                kind: group.kind,
                strength: (touches / 2 + 1).min(MAX_STRENGTH) as u8,
                touches,
            }
        })
        .collect();

    levels.sort_by(|a, b| b.level.total_cmp(&a.level));
    levels
}
