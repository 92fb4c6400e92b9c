//! Scoring policy: entry rule, per-tier evidence weights and thresholds.
//!
//! Each strategy variant is a concrete `ScoringPolicy` instance; the engine is
//! the same for all of them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::models::signal::Tier;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("unknown strategy variant: {0}")]
    UnknownVariant(String),
    #[error("{tier} tier: weight '{name}' must be non-negative, got {value}")]
    NegativeWeight {
        tier: Tier,
        name: &'static str,
        value: f64,
    },
    #[error("{tier} tier: {name} must be within [0, 100], got {value}")]
    ThresholdOutOfRange {
        tier: Tier,
        name: &'static str,
        value: f64,
    },
    #[error("{tier} tier: risk-reward factor must be positive, got {value}")]
    NonPositiveRiskReward { tier: Tier, value: f64 },
    #[error("RSI buy cutoff {buy} must not exceed sell cutoff {sell}")]
    InvertedRsiCutoffs { buy: f64, sell: f64 },
    #[error("invalid policy document: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyVariant {
    MeanReversionWide,
    MeanReversionStrict,
    CrossoverGated,
}

impl FromStr for StrategyVariant {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "mean-reversion-wide" => Ok(StrategyVariant::MeanReversionWide),
            "mean-reversion-strict" => Ok(StrategyVariant::MeanReversionStrict),
            "crossover-gated" => Ok(StrategyVariant::CrossoverGated),
            other => Err(PolicyError::UnknownVariant(other.to_string())),
        }
    }
}

/// How a candidate direction is picked and which gates apply before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRule {
    /// RSI strictly below this makes BUY the candidate. With
    /// `require_crossover`, a cross-down below it is treated as exhausted.
    pub rsi_buy_below: f64,
    /// RSI strictly above this makes SELL the candidate. With
    /// `require_crossover`, a cross-up above it is treated as exhausted.
    pub rsi_sell_above: f64,
    /// SHORT bias blocks BUY, LONG bias blocks SELL.
    #[serde(default)]
    pub bias_gate: bool,
    /// The EMA crossover picks the direction; RSI only vetoes overextended entries.
    #[serde(default)]
    pub require_crossover: bool,
}

/// Points awarded per boolean evidence term.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceWeights {
    pub high_volume: f64,
    pub near_pivot: f64,
    pub near_fibonacci: f64,
    pub clean_candle: f64,
    pub near_liquidity: f64,
    pub near_order_block: f64,
    pub mss_aligned: f64,
    pub near_poc: f64,
    /// SELL-side only.
    pub williams_r: f64,
    pub bollinger_extreme: f64,
}

impl EvidenceWeights {
    pub fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("high_volume", self.high_volume),
            ("near_pivot", self.near_pivot),
            ("near_fibonacci", self.near_fibonacci),
            ("clean_candle", self.clean_candle),
            ("near_liquidity", self.near_liquidity),
            ("near_order_block", self.near_order_block),
            ("mss_aligned", self.mss_aligned),
            ("near_poc", self.near_poc),
            ("williams_r", self.williams_r),
            ("bollinger_extreme", self.bollinger_extreme),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Minimum confidence (points) for an actionable signal.
    pub threshold: f64,
    /// Sub-threshold results at or above this are reported as advisories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_threshold: Option<f64>,
    pub weights: EvidenceWeights,
    /// Volume ratio above this counts as high volume.
    pub high_volume_ratio: f64,
    /// Wick-to-body ratio below this counts as a clean candle.
    pub max_wick_ratio: f64,
    /// Williams %R above this confirms overbought.
    pub williams_r_trigger: f64,
    pub risk_reward: f64,
}

impl TierPolicy {
    fn primary_defaults(weights: EvidenceWeights, high_volume_ratio: f64) -> Self {
        Self {
            threshold: 75.0,
            watch_threshold: None,
            weights,
            high_volume_ratio,
            max_wick_ratio: 0.4,
            williams_r_trigger: -10.0,
            risk_reward: 1.8,
        }
    }

    fn forced_defaults(weights: EvidenceWeights, high_volume_ratio: f64) -> Self {
        Self {
            threshold: 60.0,
            watch_threshold: None,
            weights,
            high_volume_ratio,
            max_wick_ratio: 0.5,
            williams_r_trigger: -15.0,
            risk_reward: 1.5,
        }
    }

    fn validate(&self, tier: Tier) -> Result<(), PolicyError> {
        for (name, value) in self.weights.entries() {
            if value < 0.0 || value.is_nan() {
                return Err(PolicyError::NegativeWeight { tier, name, value });
            }
        }
        let thresholds = [
            ("threshold", Some(self.threshold)),
            ("watch_threshold", self.watch_threshold),
        ];
        for (name, value) in thresholds {
            if let Some(value) = value {
                if !(0.0..=100.0).contains(&value) {
                    return Err(PolicyError::ThresholdOutOfRange { tier, name, value });
                }
            }
        }
        if self.risk_reward <= 0.0 || self.risk_reward.is_nan() {
            return Err(PolicyError::NonPositiveRiskReward {
                tier,
                value: self.risk_reward,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    pub rsi: u32,
    pub ema_fast: u32,
    pub ema_slow: u32,
    pub ema_trend: u32,
    pub macd_fast: u32,
    pub macd_slow: u32,
    pub macd_signal: u32,
    pub bollinger: u32,
    pub bollinger_std_dev: f64,
    pub atr: u32,
    pub williams_r: u32,
    pub volume_ma: u32,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            rsi: 14,
            ema_fast: 9,
            ema_slow: 21,
            ema_trend: 26,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger: 20,
            bollinger_std_dev: 2.0,
            atr: 14,
            williams_r: 14,
            volume_ma: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub pivot_window: usize,
    /// Pivots closer than this fraction of price are merged.
    pub pivot_merge_tolerance: f64,
    pub fib_lookback: usize,
    pub liquidity_lookback: usize,
    pub liquidity_volume_percentile: f64,
    pub liquidity_body_ratio: f64,
    pub void_volume_factor: f64,
    pub void_range_factor: f64,
    pub void_volume_window: usize,
    pub void_range_window: usize,
    pub order_block_lookback: usize,
    pub order_block_window: usize,
    pub mss_lookback: usize,
    pub poc_lookback: usize,
    pub poc_bins: usize,
    /// Proximity tolerance for pivots and Fibonacci levels.
    pub level_tolerance: f64,
    /// Proximity tolerance for liquidity, order-block and POC checks.
    pub zone_tolerance: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            pivot_window: 5,
            pivot_merge_tolerance: 0.005,
            fib_lookback: 50,
            liquidity_lookback: 50,
            liquidity_volume_percentile: 0.8,
            liquidity_body_ratio: 0.6,
            void_volume_factor: 0.5,
            void_range_factor: 1.5,
            void_volume_window: 20,
            void_range_window: 10,
            order_block_lookback: 50,
            order_block_window: 3,
            mss_lookback: 20,
            poc_lookback: 50,
            poc_bins: 50,
            level_tolerance: 0.003,
            zone_tolerance: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub name: String,
    pub entry: EntryRule,
    pub primary: TierPolicy,
    pub forced: TierPolicy,
    #[serde(default)]
    pub periods: IndicatorPeriods,
    #[serde(default)]
    pub structure: StructureConfig,
    /// ATR multiple used for the stop when no structural floor applies.
    #[serde(default = "default_atr_stop_multiplier")]
    pub atr_stop_multiplier: f64,
}

fn default_atr_stop_multiplier() -> f64 {
    1.5
}

fn primary_weights() -> EvidenceWeights {
    EvidenceWeights {
        high_volume: 25.0,
        near_pivot: 25.0,
        near_fibonacci: 30.0,
        clean_candle: 15.0,
        near_liquidity: 15.0,
        near_order_block: 15.0,
        mss_aligned: 10.0,
        near_poc: 10.0,
        williams_r: 10.0,
        bollinger_extreme: 0.0,
    }
}

fn forced_weights() -> EvidenceWeights {
    EvidenceWeights {
        high_volume: 20.0,
        near_pivot: 20.0,
        clean_candle: 20.0,
        ..primary_weights()
    }
}

impl ScoringPolicy {
    pub fn preset(variant: StrategyVariant) -> Self {
        match variant {
            StrategyVariant::MeanReversionWide => Self::mean_reversion_wide(),
            StrategyVariant::MeanReversionStrict => Self::mean_reversion_strict(),
            StrategyVariant::CrossoverGated => Self::crossover_gated(),
        }
    }

    /// RSI < 40 buys, RSI > 65 sells, no gates; sub-threshold results ≥ 40 are advisories.
    pub fn mean_reversion_wide() -> Self {
        let band = EvidenceWeights {
            bollinger_extreme: 10.0,
            ..primary_weights()
        };
        let mut primary = TierPolicy::primary_defaults(band.clone(), 1.5);
        primary.watch_threshold = Some(40.0);
        Self {
            name: "mean-reversion-wide".to_string(),
            entry: EntryRule {
                rsi_buy_below: 40.0,
                rsi_sell_above: 65.0,
                bias_gate: false,
                require_crossover: false,
            },
            primary,
            forced: TierPolicy::forced_defaults(
                EvidenceWeights {
                    bollinger_extreme: 10.0,
                    ..forced_weights()
                },
                1.3,
            ),
            periods: IndicatorPeriods::default(),
            structure: StructureConfig::default(),
            atr_stop_multiplier: default_atr_stop_multiplier(),
        }
    }

    /// RSI < 30 buys unless bias is SHORT, RSI > 70 sells unless bias is LONG.
    pub fn mean_reversion_strict() -> Self {
        Self {
            name: "mean-reversion-strict".to_string(),
            entry: EntryRule {
                rsi_buy_below: 30.0,
                rsi_sell_above: 70.0,
                bias_gate: true,
                require_crossover: false,
            },
            primary: TierPolicy::primary_defaults(primary_weights(), 1.5),
            forced: TierPolicy::forced_defaults(forced_weights(), 1.3),
            periods: IndicatorPeriods::default(),
            structure: StructureConfig::default(),
            atr_stop_multiplier: default_atr_stop_multiplier(),
        }
    }

    /// EMA 9 crossing EMA 21/26 picks the direction; cross-ups with RSI > 70
    /// and cross-downs with RSI < 30 are skipped.
    pub fn crossover_gated() -> Self {
        let mut periods = IndicatorPeriods::default();
        periods.ema_slow = 26;
        Self {
            name: "crossover-gated".to_string(),
            entry: EntryRule {
                rsi_buy_below: 30.0,
                rsi_sell_above: 70.0,
                bias_gate: false,
                require_crossover: true,
            },
            primary: TierPolicy::primary_defaults(primary_weights(), 2.0),
            forced: TierPolicy::forced_defaults(forced_weights(), 1.5),
            periods,
            structure: StructureConfig::default(),
            atr_stop_multiplier: default_atr_stop_multiplier(),
        }
    }

    pub fn tier(&self, tier: Tier) -> &TierPolicy {
        match tier {
            Tier::Primary => &self.primary,
            Tier::Forced => &self.forced,
        }
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.entry.rsi_buy_below > self.entry.rsi_sell_above {
            return Err(PolicyError::InvertedRsiCutoffs {
                buy: self.entry.rsi_buy_below,
                sell: self.entry.rsi_sell_above,
            });
        }
        self.primary.validate(Tier::Primary)?;
        self.forced.validate(Tier::Forced)?;
        Ok(())
    }

    /// Parse and validate a JSON policy document.
    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        let policy: Self =
            serde_json::from_str(raw).map_err(|e| PolicyError::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::mean_reversion_strict()
    }
}
