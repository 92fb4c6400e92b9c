//! Structural price levels and classifications.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LevelKind {
    Support,
    Resistance,
    FibRetracement,
    LiquidityPool,
    LiquidityVoid,
    OrderBlockBull,
    OrderBlockBear,
    PointOfControl,
}

/// A price level, or a `[low, high]` zone when the feature spans a candle.
///
/// Point levels carry `low == high == price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralLevel {
    pub kind: LevelKind,
    pub price: f64,
    pub low: f64,
    pub high: f64,
}

impl StructuralLevel {
    pub fn point(kind: LevelKind, price: f64) -> Self {
        Self {
            kind,
            price,
            low: price,
            high: price,
        }
    }

    pub fn zone(kind: LevelKind, low: f64, high: f64) -> Self {
        Self {
            kind,
            price: (low + high) / 2.0,
            low,
            high,
        }
    }

    /// True when `price` lies within the level widened by `tolerance` (fractional).
    pub fn is_near(&self, price: f64, tolerance: f64) -> bool {
        price >= self.low * (1.0 - tolerance) && price <= self.high * (1.0 + tolerance)
    }
}

pub fn near_any(levels: &[StructuralLevel], price: f64, tolerance: f64) -> bool {
    levels.iter().any(|level| level.is_near(price, tolerance))
}

pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Retracement levels measured down from the swing high.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub swing_high: f64,
    pub swing_low: f64,
    pub levels: Vec<(f64, f64)>,
}

impl FibonacciLevels {
    pub fn new(swing_high: f64, swing_low: f64) -> Self {
        let span = swing_high - swing_low;
        let levels = FIB_RATIOS
            .iter()
            .map(|&ratio| (ratio, swing_high - span * ratio))
            .collect();
        Self {
            swing_high,
            swing_low,
            levels,
        }
    }

    pub fn level(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|(r, _)| (r - ratio).abs() < 1e-9)
            .map(|&(_, price)| price)
    }

    pub fn as_levels(&self) -> Vec<StructuralLevel> {
        self.levels
            .iter()
            .map(|&(_, price)| StructuralLevel::point(LevelKind::FibRetracement, price))
            .collect()
    }

    /// Highest retracement level strictly below `price`.
    pub fn nearest_below(&self, price: f64) -> Option<f64> {
        self.levels
            .iter()
            .map(|&(_, p)| p)
            .filter(|&p| p < price)
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
    }

    /// Lowest retracement level strictly above `price`.
    pub fn nearest_above(&self, price: f64) -> Option<f64> {
        self.levels
            .iter()
            .map(|&(_, p)| p)
            .filter(|&p| p > price)
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.min(p))))
    }
}

/// Market-structure-shift classification of recent swings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStructure {
    Bullish,
    Bearish,
    Neutral,
}

/// Everything the structure detectors found for one asset this cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSet {
    pub supports: Vec<StructuralLevel>,
    pub resistances: Vec<StructuralLevel>,
    pub fibonacci: Option<FibonacciLevels>,
    pub liquidity_pools: Vec<StructuralLevel>,
    pub liquidity_voids: Vec<StructuralLevel>,
    pub bullish_order_blocks: Vec<StructuralLevel>,
    pub bearish_order_blocks: Vec<StructuralLevel>,
    pub market_structure: MarketStructure,
    pub point_of_control: Option<f64>,
}

impl Default for StructureSet {
    fn default() -> Self {
        Self {
            supports: Vec::new(),
            resistances: Vec::new(),
            fibonacci: None,
            liquidity_pools: Vec::new(),
            liquidity_voids: Vec::new(),
            bullish_order_blocks: Vec::new(),
            bearish_order_blocks: Vec::new(),
            market_structure: MarketStructure::Neutral,
            point_of_control: None,
        }
    }
}

impl StructureSet {
    pub fn fib_levels(&self) -> Vec<StructuralLevel> {
        self.fibonacci
            .as_ref()
            .map(FibonacciLevels::as_levels)
            .unwrap_or_default()
    }

    pub fn poc_level(&self) -> Option<StructuralLevel> {
        self.point_of_control
            .map(|poc| StructuralLevel::point(LevelKind::PointOfControl, poc))
    }

    /// Liquidity pools and voids together.
    pub fn liquidity_zones(&self) -> impl Iterator<Item = &StructuralLevel> {
        self.liquidity_pools.iter().chain(self.liquidity_voids.iter())
    }
}
