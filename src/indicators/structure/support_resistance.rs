//! Support and resistance from swing pivots

use crate::models::indicators::Candle;
use crate::models::structure::{LevelKind, StructuralLevel};

/// Detect pivot highs (resistance) and pivot lows (support).
///
/// A bar is a pivot high when its high is >= every high within `window` bars
/// on both sides; pivot lows mirror this on lows. Levels closer than
/// `merge_tolerance` (fraction of price) to an earlier level are dropped.
pub fn calculate_support_resistance(
    candles: &[Candle],
    window: usize,
    merge_tolerance: f64,
) -> (Vec<StructuralLevel>, Vec<StructuralLevel>) {
    if window == 0 || candles.len() < 2 * window + 1 {
        return (Vec::new(), Vec::new());
    }

    let mut supports = Vec::new();
    let mut resistances = Vec::new();

    for i in window..candles.len() - window {
        let neighbourhood = &candles[i - window..=i + window];
        let bar = &candles[i];

        if neighbourhood.iter().all(|c| bar.high >= c.high) {
            resistances.push(bar.high);
        }
        if neighbourhood.iter().all(|c| bar.low <= c.low) {
            supports.push(bar.low);
        }
    }

    (
        merge_levels(&supports, merge_tolerance)
            .into_iter()
            .map(|p| StructuralLevel::point(LevelKind::Support, p))
            .collect(),
        merge_levels(&resistances, merge_tolerance)
            .into_iter()
            .map(|p| StructuralLevel::point(LevelKind::Resistance, p))
            .collect(),
    )
}

/// Keep the first of any group of levels within `tolerance` of each other.
pub fn merge_levels(levels: &[f64], tolerance: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::new();
    for &level in levels {
        let duplicate = kept
            .iter()
            .any(|&k| k != 0.0 && ((level - k) / k).abs() < tolerance);
        if !duplicate {
            kept.push(level);
        }
    }
    kept
}
