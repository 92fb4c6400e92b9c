//! Unit tests for ATR and Bollinger Bands

use confluence::indicators::volatility::{
    at_lower_band, at_upper_band, calculate_atr, calculate_bollinger_bands,
};

use crate::support::{closes, flat};

#[test]
fn atr_of_uniform_bars_is_their_range() {
    let atr = calculate_atr(&flat(20, 100.0), 14).unwrap();
    assert!((atr.value - 1.0).abs() < 1e-9);
}

#[test]
fn atr_includes_gaps() {
    // Each bar is 1 wide but opens 5 above the previous close.
    let series: Vec<f64> = (0..20).map(|i| 100.0 + 5.0 * i as f64).collect();
    let atr = calculate_atr(&closes(&series), 14).unwrap();
    assert!((atr.value - 5.5).abs() < 1e-9);
}

#[test]
fn atr_needs_period_plus_one_bars() {
    assert!(calculate_atr(&flat(14, 100.0), 14).is_none());
}

#[test]
fn bollinger_collapses_on_flat_series() {
    let bands = calculate_bollinger_bands(&flat(25, 50.0), 20, 2.0).unwrap();
    assert_eq!(bands.upper, 50.0);
    assert_eq!(bands.middle, 50.0);
    assert_eq!(bands.lower, 50.0);
    assert!(at_lower_band(50.0, &bands));
    assert!(at_upper_band(50.0, &bands));
}

#[test]
fn bollinger_width_is_two_sigma() {
    // Closes alternate 9/11: mean 10, population sigma 1.
    let series: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 9.0 } else { 11.0 }).collect();
    let bands = calculate_bollinger_bands(&closes(&series), 20, 2.0).unwrap();
    assert!((bands.middle - 10.0).abs() < 1e-9);
    assert!((bands.upper - 12.0).abs() < 1e-9);
    assert!((bands.lower - 8.0).abs() < 1e-9);
    assert!(!at_lower_band(9.0, &bands));
    assert!(at_lower_band(8.0, &bands));
}
