//! Order blocks: the last opposite candle before a held move

use crate::models::indicators::Candle;
use crate::models::structure::{LevelKind, StructuralLevel};

/// Returns `(bullish, bearish)` order-block zones found in the last `lookback` bars.
///
/// Bullish: a bearish candle whose low holds under every close of the next
/// `window` bars. Bearish: a bullish candle whose high caps every close of the
/// next `window` bars. Bars without `window` successors are not considered.
pub fn find_order_blocks(
    candles: &[Candle],
    lookback: usize,
    window: usize,
) -> (Vec<StructuralLevel>, Vec<StructuralLevel>) {
    if window == 0 || lookback == 0 || candles.len() < lookback || lookback <= window {
        return (Vec::new(), Vec::new());
    }

    let start = candles.len() - lookback;
    let mut bullish = Vec::new();
    let mut bearish = Vec::new();

    for i in start..candles.len() - window {
        let bar = &candles[i];
        let following = &candles[i + 1..=i + window];

        if bar.is_bearish() && following.iter().all(|c| c.close > bar.low) {
            bullish.push(StructuralLevel::zone(LevelKind::OrderBlockBull, bar.low, bar.high));
        }
        if bar.is_bullish() && following.iter().all(|c| c.close < bar.high) {
            bearish.push(StructuralLevel::zone(LevelKind::OrderBlockBear, bar.low, bar.high));
        }
    }

    (bullish, bearish)
}
