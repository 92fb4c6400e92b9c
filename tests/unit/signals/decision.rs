//! Unit tests for stop-loss / take-profit geometry

use confluence::models::indicators::{
    AtrIndicator, BollingerBandsIndicator, EmaCrossIndicator, EmaIndicator, IndicatorSet,
};
use confluence::models::signal::SignalDirection;
use confluence::models::structure::{FibonacciLevels, StructureSet};
use confluence::signals::decision::{risk_reward_ratio, take_profit, RiskGeometry};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn bands(lower: f64, upper: f64) -> BollingerBandsIndicator {
    BollingerBandsIndicator {
        upper,
        middle: (upper + lower) / 2.0,
        lower,
        period: 20,
        std_dev: 2.0,
    }
}

fn trend_ema(value: f64) -> EmaCrossIndicator {
    EmaCrossIndicator {
        fast: EmaIndicator { value, period: 9 },
        slow: EmaIndicator { value, period: 26 },
        prev_fast: value,
        prev_slow: value,
    }
}

#[test]
fn buy_target_projects_risk_by_factor() {
    let geometry = RiskGeometry::from_stop(SignalDirection::Buy, 100.0, 95.0, 1.8);
    assert!(approx(geometry.take_profit, 109.0));
    assert!(approx(geometry.risk_reward, 1.8));
}

#[test]
fn sell_target_mirrors_buy() {
    assert!(approx(take_profit(SignalDirection::Sell, 100.0, 104.0, 1.5), 94.0));
    assert!(approx(risk_reward_ratio(100.0, 104.0, 94.0), 1.5));
}

#[test]
fn buy_stop_is_highest_floor_below_entry() {
    let mut set = IndicatorSet::new("BTC/USD".to_string(), 100.0);
    set.bollinger = Some(bands(96.0, 106.0));
    set.ema_trend_cross = Some(trend_ema(98.0));
    let structure = StructureSet {
        point_of_control: Some(110.0),
        fibonacci: Some(FibonacciLevels::new(120.0, 80.0)),
        ..StructureSet::default()
    };

    let geometry = RiskGeometry::compute(SignalDirection::Buy, 100.0, &set, &structure, 1.8, 1.5);
    // Candidates below entry: 96.0 (band), 97.51 (EMA x0.995), 95.28 (fib 0.618).
    // POC x0.99 = 108.9 sits above entry and is ignored.
    assert!(approx(geometry.stop_loss, 98.0 * 0.995));
    assert!(approx(geometry.take_profit, 100.0 + (100.0 - 97.51) * 1.8));
}

#[test]
fn sell_stop_is_lowest_ceiling_above_entry() {
    let mut set = IndicatorSet::new("BTC/USD".to_string(), 100.0);
    set.bollinger = Some(bands(94.0, 103.0));
    let structure = StructureSet {
        point_of_control: Some(101.0),
        ..StructureSet::default()
    };

    let geometry = RiskGeometry::compute(SignalDirection::Sell, 100.0, &set, &structure, 1.5, 1.5);
    assert!(approx(geometry.stop_loss, 102.01));
    assert!(geometry.take_profit < 100.0);
    assert!(approx(geometry.risk_reward, 1.5));
}

#[test]
fn falls_back_to_atr_without_structure() {
    let mut set = IndicatorSet::new("BTC/USD".to_string(), 100.0);
    set.atr = Some(AtrIndicator { value: 2.0, period: 14 });

    let geometry = RiskGeometry::compute(SignalDirection::Buy, 100.0, &set, &StructureSet::default(), 1.8, 1.5);
    assert!(approx(geometry.stop_loss, 97.0));
    assert!(approx(geometry.take_profit, 105.4));
}

#[test]
fn no_candidates_collapse_onto_entry() {
    let set = IndicatorSet::new("BTC/USD".to_string(), 100.0);
    let geometry = RiskGeometry::compute(SignalDirection::Buy, 100.0, &set, &StructureSet::default(), 1.8, 1.5);
    assert!(geometry.is_degenerate(100.0));
    assert_eq!(geometry.take_profit, 100.0);
    assert_eq!(geometry.risk_reward, 0.0);
}

#[test]
fn hold_has_no_geometry() {
    let set = IndicatorSet::new("BTC/USD".to_string(), 100.0);
    assert_eq!(
        RiskGeometry::compute(SignalDirection::Hold, 100.0, &set, &StructureSet::default(), 1.8, 1.5),
        RiskGeometry::none()
    );
}
