//! Structure detectors: pivots, Fibonacci, liquidity, order blocks, MSS, POC

pub mod fibonacci;
pub mod liquidity;
pub mod market_structure;
pub mod order_blocks;
pub mod support_resistance;
pub mod volume_profile;

pub use fibonacci::*;
pub use liquidity::*;
pub use market_structure::*;
pub use order_blocks::*;
pub use support_resistance::*;
pub use volume_profile::*;

use crate::models::indicators::Candle;
use crate::models::policy::StructureConfig;
use crate::models::structure::StructureSet;

/// Runs every structure detector over a candle series.
///
/// Detectors short of bars return empty results rather than failing.
pub struct StructureDetector {
    config: StructureConfig,
}

impl StructureDetector {
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StructureConfig {
        &self.config
    }

    pub fn detect(&self, candles: &[Candle]) -> StructureSet {
        let cfg = &self.config;

        let (supports, resistances) =
            calculate_support_resistance(candles, cfg.pivot_window, cfg.pivot_merge_tolerance);
        let (bullish_order_blocks, bearish_order_blocks) =
            find_order_blocks(candles, cfg.order_block_lookback, cfg.order_block_window);

        StructureSet {
            supports,
            resistances,
            fibonacci: calculate_fibonacci(candles, cfg.fib_lookback),
            liquidity_pools: find_liquidity_pools(
                candles,
                cfg.liquidity_lookback,
                cfg.liquidity_volume_percentile,
                cfg.liquidity_body_ratio,
            ),
            liquidity_voids: find_liquidity_voids(
                candles,
                VoidParams {
                    lookback: cfg.liquidity_lookback,
                    volume_window: cfg.void_volume_window,
                    volume_factor: cfg.void_volume_factor,
                    range_window: cfg.void_range_window,
                    range_factor: cfg.void_range_factor,
                },
            ),
            bullish_order_blocks,
            bearish_order_blocks,
            market_structure: classify_market_structure(candles, cfg.mss_lookback),
            point_of_control: calculate_point_of_control(candles, cfg.poc_lookback, cfg.poc_bins),
        }
    }
}

impl Default for StructureDetector {
    fn default() -> Self {
        Self::new(StructureConfig::default())
    }
}
