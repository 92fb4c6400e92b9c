//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod policy;
pub mod signal;
pub mod structure;

pub use indicators::{
    AtrIndicator, BollingerBandsIndicator, Candle, Crossover, EmaCrossIndicator, EmaIndicator,
    IndicatorSet, MacdIndicator, RsiIndicator, VolumeIndicator, WilliamsRIndicator,
};
pub use policy::{
    EntryRule, EvidenceWeights, IndicatorPeriods, PolicyError, ScoringPolicy, StrategyVariant,
    StructureConfig, TierPolicy,
};
pub use signal::{Bias, Signal, SignalDirection, SignalReason, Tier};
pub use structure::{
    FibonacciLevels, LevelKind, MarketStructure, StructuralLevel, StructureSet, FIB_RATIOS,
};
