//! Current volume relative to its rolling mean

use crate::common::math;
use crate::models::indicators::{Candle, VolumeIndicator};

/// The moving average includes the current bar.
pub fn calculate_volume(candles: &[Candle], ma_period: u32) -> Option<VolumeIndicator> {
    let current = candles.last()?.volume;
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let volume_ma = math::sma(&volumes, ma_period as usize);

    Some(VolumeIndicator {
        volume: current,
        volume_ma,
        volume_ma_period: volume_ma.map(|_| ma_period),
    })
}
