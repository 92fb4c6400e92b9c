//! Momentum indicators: RSI, MACD, Williams %R

pub mod macd;
pub mod rsi;
pub mod williams_r;

pub use macd::*;
pub use rsi::*;
pub use williams_r::*;
