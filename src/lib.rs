//! Confluence signal engine.
//!
//! Turns OHLCV candle series into structural features and momentum readings,
//! scores their confluence and selects at most one alert per evaluation cycle.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
