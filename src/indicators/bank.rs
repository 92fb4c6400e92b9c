//! Computes the full indicator set for one asset

use crate::indicators::momentum::{calculate_macd, calculate_rsi, calculate_williams_r};
use crate::indicators::trend::calculate_ema_cross;
use crate::indicators::volatility::{calculate_atr, calculate_bollinger_bands};
use crate::indicators::volume::calculate_volume;
use crate::models::indicators::{Candle, IndicatorSet};
use crate::models::policy::IndicatorPeriods;

/// Pure function of the candle series. Indicators short of bars are left `None`.
pub struct IndicatorBank {
    periods: IndicatorPeriods,
}

impl IndicatorBank {
    pub fn new(periods: IndicatorPeriods) -> Self {
        Self { periods }
    }

    pub fn compute(&self, symbol: &str, candles: &[Candle]) -> Option<IndicatorSet> {
        let last = candles.last()?;
        let p = &self.periods;

        let mut set = IndicatorSet::new(symbol.to_string(), last.close);
        set.timestamp = last.timestamp;
        set.rsi = calculate_rsi(candles, p.rsi);
        set.macd = calculate_macd(candles, p.macd_fast, p.macd_slow, p.macd_signal);
        set.ema_cross = calculate_ema_cross(candles, p.ema_fast, p.ema_slow);
        set.ema_trend_cross = calculate_ema_cross(candles, p.ema_fast, p.ema_trend);
        set.bollinger = calculate_bollinger_bands(candles, p.bollinger, p.bollinger_std_dev);
        set.atr = calculate_atr(candles, p.atr);
        set.williams_r = calculate_williams_r(candles, p.williams_r);
        set.volume = calculate_volume(candles, p.volume_ma);

        Some(set)
    }
}

impl Default for IndicatorBank {
    fn default() -> Self {
        Self::new(IndicatorPeriods::default())
    }
}
