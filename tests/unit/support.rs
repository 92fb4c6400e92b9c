//! Candle builders and in-memory collaborators shared by unit tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use confluence::models::indicators::Candle;
use confluence::models::signal::Signal;
use confluence::services::alerts::{AlertDispatcher, DispatchError};
use confluence::services::market_data::{FetchError, MarketDataProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn bar_time(i: usize) -> DateTime<Utc> {
    t0() + Duration::minutes(15 * i as i64)
}

/// Steady decline: every bar bearish, RSI pinned at 0.
pub fn falling(count: usize, start: f64, step: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let open = start - step * i as f64;
            let close = open - step;
            Candle::new(open, open + 0.2, close - 0.2, close, 1_000.0, bar_time(i))
        })
        .collect()
}

/// Steady advance: every bar bullish, RSI pinned at 100.
pub fn rising(count: usize, start: f64, step: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let open = start + step * i as f64;
            let close = open + step;
            Candle::new(open, close + 0.2, open - 0.2, close, 1_000.0, bar_time(i))
        })
        .collect()
}

/// Unchanged closes: RSI 50, never a candidate.
pub fn flat(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::new(price, price + 0.5, price - 0.5, price, 1_000.0, bar_time(i)))
        .collect()
}

pub fn closes(values: &[f64]) -> Vec<Candle> {
    values
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle::new(c, c + 0.5, c - 0.5, c, 1_000.0, bar_time(i)))
        .collect()
}

/// Serves canned series per symbol; symbols without a series fail to fetch.
#[derive(Default)]
pub struct StaticProvider {
    series: HashMap<String, Vec<Candle>>,
    calls: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.series.insert(symbol.to_string(), candles);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, symbol: &str) -> usize {
        self.calls().iter().filter(|s| s.as_str() == symbol).count()
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(
        &self,
        symbol: &str,
        _timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        let candles = self
            .series
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::Api(format!("unknown pair {}", symbol)))?;
        let skip = candles.len().saturating_sub(limit);
        Ok(candles.into_iter().skip(skip).collect())
    }
}

/// Records every signal it is asked to deliver.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Signal>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Signal> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertDispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(&self, signal: &Signal) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DispatchError::Rejected("chat not found".to_string()));
        }
        self.sent.lock().unwrap().push(signal.clone());
        Ok(())
    }
}

/// No gates, and any RSI extreme qualifies under the primary tier.
pub fn permissive_policy() -> confluence::models::policy::ScoringPolicy {
    let mut policy = confluence::models::policy::ScoringPolicy::mean_reversion_wide();
    policy.primary.threshold = 0.0;
    policy
}

/// Nothing qualifies under the primary tier; any RSI extreme qualifies under the forced tier.
pub fn forced_only_policy() -> confluence::models::policy::ScoringPolicy {
    let mut policy = confluence::models::policy::ScoringPolicy::mean_reversion_wide();
    policy.primary.threshold = 100.0;
    policy.primary.watch_threshold = None;
    policy.primary.weights = Default::default();
    policy.forced.threshold = 0.0;
    policy
}
