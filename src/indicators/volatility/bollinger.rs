//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::{BollingerBandsIndicator, Candle};

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * standard deviation)
/// Lower Band = Middle - (std_dev * standard deviation)
pub fn calculate_bollinger_bands(
    candles: &[Candle],
    period: u32,
    std_dev: f64,
) -> Option<BollingerBandsIndicator> {
    let n = period as usize;
    if n == 0 || candles.len() < n {
        return None;
    }

    let closes: Vec<f64> = candles[candles.len() - n..].iter().map(|c| c.close).collect();
    let middle = math::sma(&closes, n)?;
    let std = math::standard_deviation(&closes, n)?;

    Some(BollingerBandsIndicator {
        upper: middle + std_dev * std,
        middle,
        lower: middle - std_dev * std,
        period,
        std_dev,
    })
}

/// Price at or beyond the lower band.
pub fn at_lower_band(price: f64, bands: &BollingerBandsIndicator) -> bool {
    price <= bands.lower
}

/// Price at or beyond the upper band.
pub fn at_upper_band(price: f64, bands: &BollingerBandsIndicator) -> bool {
    price >= bands.upper
}
