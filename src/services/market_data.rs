//! Market data provider interface and per-symbol provider routing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::models::indicators::Candle;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("API error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported timeframe: {0}")]
    UnsupportedTimeframe(String),

    #[error("no market data provider for {0}")]
    NoProvider(String),
}

impl FetchError {
    /// Network failures, throttling and server errors are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Most recent `limit` candles for `symbol`, oldest first.
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError>;
}

/// Maps asset symbols to the venue that serves them.
#[derive(Clone, Default)]
pub struct ProviderResolver {
    default: Option<Arc<dyn MarketDataProvider>>,
    overrides: HashMap<String, Arc<dyn MarketDataProvider>>,
}

impl ProviderResolver {
    pub fn new(default: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            default: Some(default),
            overrides: HashMap::new(),
        }
    }

    /// Resolver with no default: only explicitly routed symbols resolve.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_override(
        mut self,
        symbol: impl Into<String>,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        self.overrides.insert(symbol.into(), provider);
        self
    }

    pub fn resolve(&self, symbol: &str) -> Result<Arc<dyn MarketDataProvider>, FetchError> {
        self.overrides
            .get(symbol)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| FetchError::NoProvider(symbol.to_string()))
    }
}
