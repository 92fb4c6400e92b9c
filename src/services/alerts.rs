//! Alert delivery: Telegram bot API and a log-only fallback.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::models::signal::{Signal, SignalDirection};

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("alert rejected: {0}")]
    Rejected(String),

    #[error("dispatcher not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn dispatch(&self, signal: &Signal) -> Result<(), DispatchError>;
}

/// Posts alerts to a Telegram chat through the Bot API.
pub struct TelegramDispatcher {
    client: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramDispatcher {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_base_url(TELEGRAM_API_URL, token, chat_id)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl AlertDispatcher for TelegramDispatcher {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn dispatch(&self, signal: &Signal) -> Result<(), DispatchError> {
        if self.token.is_empty() || self.chat_id.is_empty() {
            return Err(DispatchError::NotConfigured(
                "telegram token and chat id are required".to_string(),
            ));
        }

        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": format_signal_message(signal),
                "parse_mode": "Markdown",
            }))
            .send()
            .await?;

        let status = response.status();
        let body: TelegramResponse = response.json().await?;
        if !body.ok {
            return Err(DispatchError::Rejected(
                body.description
                    .unwrap_or_else(|| format!("status {}", status.as_u16())),
            ));
        }
        Ok(())
    }
}

/// Writes alerts to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, signal: &Signal) -> Result<(), DispatchError> {
        info!(
            symbol = %signal.asset,
            direction = %signal.direction,
            tier = %signal.tier,
            confidence = signal.confidence,
            "LogDispatcher: {}",
            format_signal_message(signal)
        );
        Ok(())
    }
}

/// Markdown alert body.
pub fn format_signal_message(signal: &Signal) -> String {
    let marker = match signal.direction {
        SignalDirection::Buy => "🟢",
        SignalDirection::Sell => "🔴",
        SignalDirection::Hold => "⚪",
    };
    let risk_reward = if signal.risk_reward > 0.0 {
        format!("1:{:.2}", signal.risk_reward)
    } else {
        "n/a".to_string()
    };

    let mut lines = vec![
        format!(
            "{} *{} {}* ({} tier)",
            marker, signal.direction, signal.asset, signal.tier
        ),
        format!("Confidence: {:.0}/100", signal.confidence),
        format!("Entry: {}", format_price(signal.entry_price)),
        format!("Stop loss: {}", format_price(signal.stop_loss)),
        format!("Take profit: {}", format_price(signal.take_profit)),
        format!("R:R: {}", risk_reward),
    ];

    let mut reasons = signal.reasons.clone();
    reasons.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    for reason in reasons.iter().take(3) {
        lines.push(format!("• {} (+{:.0})", reason.description, reason.weight));
    }

    lines.join("\n")
}

fn format_price(price: f64) -> String {
    if price.abs() >= 100.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.4}", price)
    }
}
