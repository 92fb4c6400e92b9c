//! Trend indicators: EMA and EMA crossovers

pub mod ema;

pub use ema::*;
