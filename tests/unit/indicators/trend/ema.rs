//! Unit tests for EMA and EMA crossovers

use confluence::indicators::trend::{calculate_ema, calculate_ema_cross, calculate_emas};
use confluence::models::indicators::Crossover;

use crate::support::{closes, flat, rising};

#[test]
fn ema_of_constant_series_is_constant() {
    let ema = calculate_ema(&flat(30, 42.0), 9).unwrap();
    assert!((ema.value - 42.0).abs() < 1e-9);
    assert_eq!(ema.period, 9);
}

#[test]
fn ema_needs_period_bars() {
    assert!(calculate_ema(&flat(8, 42.0), 9).is_none());
    assert_eq!(calculate_emas(&flat(15, 42.0), &[9, 21]).len(), 1);
}

#[test]
fn fast_ema_leads_in_uptrend() {
    let cross = calculate_ema_cross(&rising(40, 100.0, 1.0), 9, 21).unwrap();
    assert!(cross.fast.value > cross.slow.value);
    assert_eq!(cross.crossover(), Crossover::None);
}

#[test]
fn ema_cross_needs_one_bar_past_slow_period() {
    assert!(calculate_ema_cross(&flat(21, 10.0), 9, 21).is_none());
    assert!(calculate_ema_cross(&flat(22, 10.0), 9, 21).is_some());
}

#[test]
fn sharp_reversal_produces_cross_up() {
    // Flat base, then a single strong bar lifts the fast EMA over the slow one.
    let mut series = vec![100.0; 30];
    series.push(110.0);
    let cross = calculate_ema_cross(&closes(&series), 9, 21).unwrap();
    assert_eq!(cross.crossover(), Crossover::Up);
}

#[test]
fn sharp_drop_produces_cross_down() {
    let mut series = vec![100.0; 30];
    series.push(90.0);
    let cross = calculate_ema_cross(&closes(&series), 9, 21).unwrap();
    assert_eq!(cross.crossover(), Crossover::Down);
}
