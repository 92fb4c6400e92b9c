//! Macro-calendar and headline-sentiment gate applied before evaluation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::services::market_data::FetchError;

pub const CRYPTOPANIC_API_URL: &str = "https://cryptopanic.com/api/v1";
const MIN_BLOCKING_IMPACT: u8 = 2;
const HEADLINE_LIMIT: usize = 10;

const POSITIVE_WORDS: [&str; 8] = ["bull", "buy", "green", "approval", "adopt", "up", "gain", "soar"];
const NEGATIVE_WORDS: [&str; 9] = ["bear", "sell", "red", "ban", "hack", "crash", "down", "drop", "fall"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Allow,
    Block(String),
}

#[async_trait]
pub trait FundamentalFilter: Send + Sync {
    async fn check(&self, symbol: &str, now: DateTime<Utc>) -> FilterDecision;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroEvent {
    pub date: NaiveDate,
    pub name: String,
    pub impact: u8,
}

impl MacroEvent {
    /// Parse `YYYY-MM-DD|name|impact` entries separated by `;`.
    pub fn parse_list(raw: &str) -> Result<Vec<MacroEvent>, String> {
        raw.split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
                let [date, name, impact] = parts.as_slice() else {
                    return Err(format!("expected date|name|impact, got '{}'", entry));
                };
                Ok(MacroEvent {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .map_err(|e| format!("bad date '{}': {}", date, e))?,
                    name: name.to_string(),
                    impact: impact
                        .parse()
                        .map_err(|e| format!("bad impact '{}': {}", impact, e))?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn recent_headlines(&self, limit: usize) -> Result<Vec<String>, FetchError>;
}

/// Counts positive against negative keywords in headlines mentioning the asset.
pub fn classify_sentiment(headlines: &[String], asset: &str) -> Sentiment {
    let aliases = asset_aliases(asset);
    let relevant: Vec<String> = headlines
        .iter()
        .map(|h| h.to_lowercase())
        .filter(|h| words(h).any(|w| aliases.iter().any(|a| a == w)))
        .collect();

    let count = |vocabulary: &[&str]| -> usize {
        relevant
            .iter()
            .map(|h| words(h).filter(|w| vocabulary.contains(w)).count())
            .sum()
    };
    let positive = count(&POSITIVE_WORDS[..]);
    let negative = count(&NEGATIVE_WORDS[..]);

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

fn asset_aliases(asset: &str) -> Vec<String> {
    let base = asset.to_lowercase();
    let mut aliases = vec![base.clone()];
    match base.as_str() {
        "btc" => aliases.push("bitcoin".to_string()),
        "eth" => aliases.push("ethereum".to_string()),
        _ => {}
    }
    aliases
}

/// Base asset of a symbol: `BTC/USD` -> `BTC`.
pub fn base_asset(symbol: &str) -> &str {
    symbol.split(['/', '-', ':']).next().unwrap_or(symbol)
}

/// Blocks every symbol on high-impact macro days, and selected assets on negative news.
pub struct MacroCalendarFilter {
    events: Vec<MacroEvent>,
    headlines: Option<Arc<dyn HeadlineSource>>,
    sentiment_assets: Vec<String>,
}

impl MacroCalendarFilter {
    pub fn new(events: Vec<MacroEvent>) -> Self {
        Self {
            events,
            headlines: None,
            sentiment_assets: vec!["BTC".to_string(), "ETH".to_string()],
        }
    }

    pub fn with_headlines(mut self, source: Arc<dyn HeadlineSource>) -> Self {
        self.headlines = Some(source);
        self
    }

    pub fn with_sentiment_assets(mut self, assets: Vec<String>) -> Self {
        self.sentiment_assets = assets;
        self
    }

    fn high_impact_event(&self, now: DateTime<Utc>) -> Option<&MacroEvent> {
        let today = now.date_naive();
        self.events
            .iter()
            .find(|e| e.date == today && e.impact >= MIN_BLOCKING_IMPACT)
    }
}

#[async_trait]
impl FundamentalFilter for MacroCalendarFilter {
    async fn check(&self, symbol: &str, now: DateTime<Utc>) -> FilterDecision {
        if let Some(event) = self.high_impact_event(now) {
            info!(symbol = %symbol, event = %event.name, impact = event.impact, "Macro event today, blocking");
            return FilterDecision::Block(format!("macro event: {}", event.name));
        }

        let asset = base_asset(symbol);
        let Some(source) = &self.headlines else {
            return FilterDecision::Allow;
        };
        if !self.sentiment_assets.iter().any(|a| a.eq_ignore_ascii_case(asset)) {
            return FilterDecision::Allow;
        }

        match source.recent_headlines(HEADLINE_LIMIT).await {
            Ok(headlines) => match classify_sentiment(&headlines, asset) {
                Sentiment::Negative => {
                    info!(symbol = %symbol, "Negative headline sentiment, blocking");
                    FilterDecision::Block(format!("negative sentiment for {}", asset))
                }
                sentiment => {
                    debug!(symbol = %symbol, sentiment = ?sentiment, "Headline sentiment");
                    FilterDecision::Allow
                }
            },
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Headline fetch failed, treating sentiment as neutral");
                FilterDecision::Allow
            }
        }
    }
}

/// Public news posts from the CryptoPanic API.
pub struct CryptoPanicHeadlines {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
}

impl CryptoPanicHeadlines {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self::with_base_url(CRYPTOPANIC_API_URL, auth_token)
    }

    pub fn with_base_url(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        }
    }
}

#[async_trait]
impl HeadlineSource for CryptoPanicHeadlines {
    async fn recent_headlines(&self, limit: usize) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(format!("{}/posts/", self.base_url))
            .query(&[("auth_token", self.auth_token.as_str()), ("public", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: PostsResponse = response.json().await?;
        Ok(body.results.into_iter().take(limit).map(|p| p.title).collect())
    }
}
