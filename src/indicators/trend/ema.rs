//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{Candle, EmaCrossIndicator, EmaIndicator};

/// Calculate EMA for a specific period
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<EmaIndicator> {
    if candles.len() < period as usize {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_value = math::ema(&closes, period as usize)?;

    Some(EmaIndicator {
        value: ema_value,
        period,
    })
}

/// Calculate multiple EMAs at once
pub fn calculate_emas(candles: &[Candle], periods: &[u32]) -> Vec<EmaIndicator> {
    periods
        .iter()
        .filter_map(|&period| calculate_ema(candles, period))
        .collect()
}

/// Current and previous-bar values of a fast/slow EMA pair
///
/// Needs one bar beyond the slow period so the previous values exist.
pub fn calculate_ema_cross(
    candles: &[Candle],
    fast_period: u32,
    slow_period: u32,
) -> Option<EmaCrossIndicator> {
    let needed = fast_period.max(slow_period) as usize + 1;
    if candles.len() < needed {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast = math::ema_series(&closes, fast_period as usize);
    let slow = math::ema_series(&closes, slow_period as usize);
    let (fast_now, fast_prev) = last_two(&fast)?;
    let (slow_now, slow_prev) = last_two(&slow)?;

    Some(EmaCrossIndicator {
        fast: EmaIndicator {
            value: fast_now,
            period: fast_period,
        },
        slow: EmaIndicator {
            value: slow_now,
            period: slow_period,
        },
        prev_fast: fast_prev,
        prev_slow: slow_prev,
    })
}

fn last_two(series: &[f64]) -> Option<(f64, f64)> {
    match series {
        [.., prev, last] => Some((*last, *prev)),
        _ => None,
    }
}
