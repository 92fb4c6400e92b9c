//! Kraken public OHLC market data provider

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::DateTime;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::indicators::Candle;
use crate::services::market_data::{FetchError, MarketDataProvider};

pub const KRAKEN_API_URL: &str = "https://api.kraken.com";
const DEFAULT_MAX_RETRIES: usize = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KrakenMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl KrakenMarketDataProvider {
    pub fn new() -> Self {
        Self::with_base_url(KRAKEN_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn fetch_once(&self, pair: &str, interval: u32) -> Result<Vec<Candle>, FetchError> {
        let url = format!("{}/0/public/OHLC", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("pair", pair.to_string()), ("interval", interval.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        parse_ohlc_response(&body)
    }
}

impl Default for KrakenMarketDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for KrakenMarketDataProvider {
    fn name(&self) -> &str {
        "kraken"
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        let interval = interval_minutes(timeframe)?;
        let pair = pair_for(symbol);

        let mut candles = (|| self.fetch_once(&pair, interval))
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .sleep(tokio::time::sleep)
            .when(FetchError::is_transient)
            .notify(|e, after| {
                warn!(pair = %pair, error = %e, retry_in = ?after, "Kraken OHLC request failed, retrying");
            })
            .await?;

        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }

        debug!(symbol = %symbol, pair = %pair, count = candles.len(), "Kraken: fetched {} candles", candles.len());
        Ok(candles)
    }
}

/// `SOL/USD` -> `SOLUSD`
pub fn pair_for(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Kraken OHLC interval in minutes for a timeframe string such as `15m` or `4h`.
pub fn interval_minutes(timeframe: &str) -> Result<u32, FetchError> {
    match timeframe {
        "1m" => Ok(1),
        "5m" => Ok(5),
        "15m" => Ok(15),
        "30m" => Ok(30),
        "1h" => Ok(60),
        "4h" => Ok(240),
        "1d" => Ok(1440),
        "1w" => Ok(10080),
        other => Err(FetchError::UnsupportedTimeframe(other.to_string())),
    }
}

/// Parse `{"error": [], "result": {"<PAIR>": [[time, o, h, l, c, vwap, volume, count]], "last": n}}`.
pub fn parse_ohlc_response(body: &Value) -> Result<Vec<Candle>, FetchError> {
    if let Some(errors) = body.get("error").and_then(Value::as_array) {
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FetchError::Api(joined));
        }
    }

    let result = body
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Parse("missing result object".to_string()))?;

    let rows = result
        .iter()
        .find(|(key, value)| key.as_str() != "last" && value.is_array())
        .and_then(|(_, value)| value.as_array())
        .ok_or_else(|| FetchError::Parse("missing OHLC rows".to_string()))?;

    rows.iter().map(parse_row).collect()
}

fn parse_row(row: &Value) -> Result<Candle, FetchError> {
    let fields = row
        .as_array()
        .filter(|f| f.len() >= 7)
        .ok_or_else(|| FetchError::Parse(format!("malformed OHLC row: {}", row)))?;

    let secs = fields[0]
        .as_i64()
        .ok_or_else(|| FetchError::Parse("OHLC time is not an integer".to_string()))?;
    let timestamp = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| FetchError::Parse(format!("OHLC time out of range: {}", secs)))?;

    Ok(Candle::new(
        number(&fields[1])?,
        number(&fields[2])?,
        number(&fields[3])?,
        number(&fields[4])?,
        number(&fields[6])?,
        timestamp,
    ))
}

fn number(value: &Value) -> Result<f64, FetchError> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| FetchError::Parse(format!("not a number: {}", s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FetchError::Parse(format!("not a number: {}", n))),
        other => Err(FetchError::Parse(format!("not a number: {}", other))),
    }
}
