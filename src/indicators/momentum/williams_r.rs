//! Williams %R oscillator

use crate::models::indicators::{Candle, WilliamsRIndicator};

/// %R = (highest high - close) / (highest high - lowest low) * -100
///
/// Ranges from -100 (at the period low) to 0 (at the period high).
pub fn calculate_williams_r(candles: &[Candle], period: u32) -> Option<WilliamsRIndicator> {
    let n = period as usize;
    if n == 0 || candles.len() < n {
        return None;
    }

    let window = &candles[candles.len() - n..];
    let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = window.last()?.close;

    let range = highest - lowest;
    let value = if range == 0.0 {
        -50.0
    } else {
        (highest - close) / range * -100.0
    };

    Some(WilliamsRIndicator { value, period })
}
