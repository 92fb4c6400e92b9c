//! Fibonacci retracement over the recent swing

use crate::models::indicators::Candle;
use crate::models::structure::FibonacciLevels;

/// Retracement levels between the highest high and lowest low of the last
/// `lookback` bars. `None` when fewer bars are available.
pub fn calculate_fibonacci(candles: &[Candle], lookback: usize) -> Option<FibonacciLevels> {
    if lookback == 0 || candles.len() < lookback {
        return None;
    }

    let window = &candles[candles.len() - lookback..];
    let swing_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let swing_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    Some(FibonacciLevels::new(swing_high, swing_low))
}
