//! Indicator and structure computations over candle series

pub mod bank;

pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use bank::IndicatorBank;
pub use structure::StructureDetector;
