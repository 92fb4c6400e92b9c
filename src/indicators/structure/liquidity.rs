//! Liquidity pools (heavy, decisive bars) and voids (thin, wide bars)

use crate::common::math;
use crate::models::indicators::Candle;
use crate::models::structure::{LevelKind, StructuralLevel};

/// Bars in the last `lookback` whose volume exceeds the window's
/// `volume_percentile` and whose body exceeds `body_ratio` of the range.
pub fn find_liquidity_pools(
    candles: &[Candle],
    lookback: usize,
    volume_percentile: f64,
    body_ratio: f64,
) -> Vec<StructuralLevel> {
    if lookback == 0 || candles.len() < lookback {
        return Vec::new();
    }

    let window = &candles[candles.len() - lookback..];
    let volumes: Vec<f64> = window.iter().map(|c| c.volume).collect();
    let Some(cutoff) = math::percentile(&volumes, volume_percentile) else {
        return Vec::new();
    };

    window
        .iter()
        .filter(|c| c.volume > cutoff && c.range() > 0.0 && c.body() > body_ratio * c.range())
        .map(|c| StructuralLevel::zone(LevelKind::LiquidityPool, c.low, c.high))
        .collect()
}

/// Parameters for void detection.
#[derive(Debug, Clone, Copy)]
pub struct VoidParams {
    pub lookback: usize,
    pub volume_window: usize,
    pub volume_factor: f64,
    pub range_window: usize,
    pub range_factor: f64,
}

/// Bars in the last `lookback` with volume below `volume_factor` x its rolling
/// mean and range above `range_factor` x the rolling mean range.
pub fn find_liquidity_voids(candles: &[Candle], params: VoidParams) -> Vec<StructuralLevel> {
    if params.lookback == 0 || candles.len() < params.lookback {
        return Vec::new();
    }

    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let ranges: Vec<f64> = candles.iter().map(Candle::range).collect();
    let volume_ma = math::rolling_mean(&volumes, params.volume_window);
    let range_ma = math::rolling_mean(&ranges, params.range_window);

    (candles.len() - params.lookback..candles.len())
        .filter_map(|i| {
            let (vol_ma, rng_ma) = (volume_ma[i]?, range_ma[i]?);
            let c = &candles[i];
            let thin = c.volume < params.volume_factor * vol_ma;
            let wide = c.range() > params.range_factor * rng_ma;
            (thin && wide).then(|| StructuralLevel::zone(LevelKind::LiquidityVoid, c.low, c.high))
        })
        .collect()
}
