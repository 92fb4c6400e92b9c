//! Unit tests for the volume ratio

use confluence::indicators::volume::calculate_volume;
use confluence::models::indicators::Candle;

use crate::support::{flat, t0};

#[test]
fn moving_average_includes_current_bar() {
    let mut candles = flat(19, 100.0);
    candles.push(Candle::new(100.0, 100.5, 99.5, 100.0, 20_000.0, t0()));
    let volume = calculate_volume(&candles, 20).unwrap();
    // (19 * 1000 + 20000) / 20
    assert_eq!(volume.volume_ma, Some(1_950.0));
    assert!((volume.ratio().unwrap() - 20_000.0 / 1_950.0).abs() < 1e-9);
}

#[test]
fn ratio_is_none_without_enough_history() {
    let volume = calculate_volume(&flat(5, 100.0), 20).unwrap();
    assert_eq!(volume.volume, 1_000.0);
    assert!(volume.ratio().is_none());
    assert!(calculate_volume(&[], 20).is_none());
}
