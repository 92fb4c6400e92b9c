//! Market-structure shift from rolling 3-bar highs and lows

use crate::models::indicators::Candle;
use crate::models::structure::MarketStructure;

const ROLLING: usize = 3;
const SHIFT: usize = 3;

/// Compares the latest rolling high/low against the value three positions
/// earlier inside the last `lookback` bars.
pub fn classify_market_structure(candles: &[Candle], lookback: usize) -> MarketStructure {
    if lookback < ROLLING + SHIFT || candles.len() < lookback {
        return MarketStructure::Neutral;
    }

    let window = &candles[candles.len() - lookback..];
    let rolling_high: Vec<f64> = window
        .windows(ROLLING)
        .map(|w| w.iter().map(|c| c.high).fold(f64::MIN, f64::max))
        .collect();
    let rolling_low: Vec<f64> = window
        .windows(ROLLING)
        .map(|w| w.iter().map(|c| c.low).fold(f64::MAX, f64::min))
        .collect();

    let last = rolling_high.len() - 1;
    let earlier = last - SHIFT;
    let highs_up = rolling_high[last] > rolling_high[earlier];
    let lows_up = rolling_low[last] > rolling_low[earlier];
    let highs_down = rolling_high[last] < rolling_high[earlier];
    let lows_down = rolling_low[last] < rolling_low[earlier];

    if highs_up && lows_up {
        MarketStructure::Bullish
    } else if highs_down && lows_down {
        MarketStructure::Bearish
    } else {
        MarketStructure::Neutral
    }
}
