use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. A candle series is ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Upper plus lower wick length.
    pub fn wicks(&self) -> f64 {
        let upper = self.high - self.open.max(self.close);
        let lower = self.open.min(self.close) - self.low;
        upper + lower
    }

    /// Wick-to-body ratio; `None` for a doji (zero body).
    pub fn wick_to_body(&self) -> Option<f64> {
        let body = self.body();
        if body == 0.0 {
            None
        } else {
            Some(self.wicks() / body)
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<(u32, u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaIndicator {
    pub value: f64,
    pub period: u32,
}

/// Direction of an EMA crossover on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    Up,
    Down,
    None,
}

/// Fast/slow EMA pair with the previous bar's values kept for crossover detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaCrossIndicator {
    pub fast: EmaIndicator,
    pub slow: EmaIndicator,
    pub prev_fast: f64,
    pub prev_slow: f64,
}

impl EmaCrossIndicator {
    /// Cross-up when fast was at or below slow one bar ago and is above it now.
    pub fn crossover(&self) -> Crossover {
        if self.prev_fast <= self.prev_slow && self.fast.value > self.slow.value {
            Crossover::Up
        } else if self.prev_fast >= self.prev_slow && self.fast.value < self.slow.value {
            Crossover::Down
        } else {
            Crossover::None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerBandsIndicator {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub period: u32,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WilliamsRIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeIndicator {
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ma_period: Option<u32>,
}

impl VolumeIndicator {
    /// Current volume over its rolling mean.
    pub fn ratio(&self) -> Option<f64> {
        match self.volume_ma {
            Some(ma) if ma > 0.0 => Some(self.volume / ma),
            _ => None,
        }
    }
}

/// Per-cycle indicator readings for one asset. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub symbol: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdIndicator>,
    /// EMA fast against the configured slow EMA (21 by default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_cross: Option<EmaCrossIndicator>,
    /// EMA fast against the trend EMA (26).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_trend_cross: Option<EmaCrossIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBandsIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub williams_r: Option<WilliamsRIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeIndicator>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

impl IndicatorSet {
    pub fn new(symbol: String, price: f64) -> Self {
        Self {
            symbol,
            price,
            rsi: None,
            macd: None,
            ema_cross: None,
            ema_trend_cross: None,
            bollinger: None,
            atr: None,
            williams_r: None,
            volume: None,
            timestamp: Utc::now(),
            timeframe: None,
        }
    }

    pub fn with_rsi(mut self, rsi: RsiIndicator) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_macd(mut self, macd: MacdIndicator) -> Self {
        self.macd = Some(macd);
        self
    }

    pub fn with_timeframe(mut self, timeframe: String) -> Self {
        self.timeframe = Some(timeframe);
        self
    }

    pub fn rsi_value(&self) -> Option<f64> {
        self.rsi.as_ref().map(|r| r.value)
    }

    pub fn volume_ratio(&self) -> Option<f64> {
        self.volume.as_ref().and_then(VolumeIndicator::ratio)
    }

    /// Trend EMA value (EMA 26 by default), used for stop placement.
    pub fn ema_trend(&self) -> Option<f64> {
        self.ema_trend_cross.as_ref().map(|c| c.slow.value)
    }

    /// Crossover on either EMA pair. Conflicting crosses on the same bar cancel out.
    pub fn ema_crossover(&self) -> Crossover {
        let crosses = [self.ema_cross.as_ref(), self.ema_trend_cross.as_ref()]
            .into_iter()
            .flatten()
            .map(EmaCrossIndicator::crossover);
        let (mut up, mut down) = (false, false);
        for cross in crosses {
            match cross {
                Crossover::Up => up = true,
                Crossover::Down => down = true,
                Crossover::None => {}
            }
        }
        match (up, down) {
            (true, false) => Crossover::Up,
            (false, true) => Crossover::Down,
            _ => Crossover::None,
        }
    }
}
