//! Volume point of control

use crate::models::indicators::Candle;

/// Midpoint of the price bin with the most traded volume over the last `lookback` bars.
///
/// Each bar adds its full volume to every bin its `[low, high]` range touches.
/// Ties resolve to the lowest-priced bin.
pub fn calculate_point_of_control(candles: &[Candle], lookback: usize, bins: usize) -> Option<f64> {
    if lookback == 0 || bins == 0 || candles.len() < lookback {
        return None;
    }

    let window = &candles[candles.len() - lookback..];
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    if high <= low {
        return Some(low);
    }

    let width = (high - low) / bins as f64;
    let mut profile = vec![0.0; bins];
    for candle in window {
        for (b, volume) in profile.iter_mut().enumerate() {
            let bin_low = low + width * b as f64;
            let bin_high = bin_low + width;
            if candle.low <= bin_high && candle.high >= bin_low {
                *volume += candle.volume;
            }
        }
    }

    let mut best = 0;
    for (b, &volume) in profile.iter().enumerate() {
        if volume > profile[best] {
            best = b;
        }
    }

    Some(low + width * (best as f64 + 0.5))
}
