//! Unit tests for RSI, MACD and Williams %R

use confluence::indicators::momentum::{calculate_macd, calculate_rsi, calculate_williams_r};
use confluence::models::indicators::Candle;

use crate::support::{closes, falling, flat, rising};

#[test]
fn rsi_requires_period_plus_one_bars() {
    assert!(calculate_rsi(&rising(14, 100.0, 1.0), 14).is_none());
    assert!(calculate_rsi(&rising(15, 100.0, 1.0), 14).is_some());
}

#[test]
fn rsi_saturates_on_one_way_moves() {
    assert_eq!(calculate_rsi(&rising(30, 100.0, 1.0), 14).unwrap().value, 100.0);
    assert_eq!(calculate_rsi(&falling(30, 200.0, 1.0), 14).unwrap().value, 0.0);
}

#[test]
fn rsi_is_neutral_on_flat_series() {
    assert_eq!(calculate_rsi(&flat(30, 100.0), 14).unwrap().value, 50.0);
}

#[test]
fn rsi_balances_equal_gains_and_losses() {
    // Alternating +1/-1 over an even number of changes.
    let series: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    let rsi = calculate_rsi(&closes(&series), 14).unwrap();
    assert!((rsi.value - 50.0).abs() < 1e-9);
}

#[test]
fn macd_needs_slow_plus_signal_bars() {
    assert!(calculate_macd(&rising(34, 100.0, 1.0), 12, 26, 9).is_none());
    assert!(calculate_macd(&rising(35, 100.0, 1.0), 12, 26, 9).is_some());
}

#[test]
fn macd_sign_follows_trend() {
    let up = calculate_macd(&rising(60, 100.0, 1.0), 12, 26, 9).unwrap();
    let down = calculate_macd(&falling(60, 200.0, 1.0), 12, 26, 9).unwrap();
    assert!(up.macd > 0.0);
    assert!(down.macd < 0.0);
    assert!((up.histogram - (up.macd - up.signal)).abs() < 1e-12);
}

#[test]
fn macd_rejects_inverted_periods() {
    assert!(calculate_macd(&rising(60, 100.0, 1.0), 26, 12, 9).is_none());
}

#[test]
fn williams_r_spans_period_range() {
    let top = calculate_williams_r(&rising(20, 100.0, 1.0), 14).unwrap();
    let bottom = calculate_williams_r(&falling(20, 200.0, 1.0), 14).unwrap();
    // Closes sit 0.2 inside the extremes of the window.
    assert!(top.value > -5.0 && top.value <= 0.0);
    assert!(bottom.value < -95.0 && bottom.value >= -100.0);
}

#[test]
fn williams_r_on_zero_range_is_midpoint() {
    let candles: Vec<Candle> = (0..14)
        .map(|_| Candle::new(10.0, 10.0, 10.0, 10.0, 1.0, crate::support::t0()))
        .collect();
    assert_eq!(calculate_williams_r(&candles, 14).unwrap().value, -50.0);
}
