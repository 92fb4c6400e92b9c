//! Environment-driven configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::core::scheduler::cron_expression;
use crate::models::policy::{PolicyError, ScoringPolicy, StrategyVariant};
use crate::services::fundamental::MacroEvent;

pub const DEFAULT_WATCH_LIST: &str = "BTC/USD,ETH/USD,SOL/USD";

/// Upper bound on the forced-tier cooldown: one week.
pub const MAX_FORCED_COOLDOWN_SECONDS: i64 = 7 * 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scoring policy: {0}")]
    Parse(#[from] PolicyError),
}

/// Deployment environment name from `APP_ENV`, lowercased. Defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .map(|v| v.trim().to_lowercase())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "sandbox".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineConfig {
    pub auth_token: String,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub watch_list: Vec<String>,
    pub timeframe: String,
    pub bar_limit: usize,
    pub min_bars: usize,
    pub cycle_interval_seconds: u64,
    pub forced_cooldown_seconds: i64,
    pub policy: ScoringPolicy,
    pub http_port: u16,
    pub kraken_api_url: Option<String>,
    pub telegram: Option<TelegramConfig>,
    pub headlines: Option<HeadlineConfig>,
    pub macro_events: Vec<MacroEvent>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let watch_list = parse_watch_list(&get("WATCH_LIST").unwrap_or_else(|| DEFAULT_WATCH_LIST.to_string()));
        if watch_list.is_empty() {
            return Err(ConfigError::Invalid {
                key: "WATCH_LIST",
                reason: "no symbols listed".to_string(),
            });
        }

        let bar_limit: usize = parse_or("BAR_LIMIT", get("BAR_LIMIT"), 100)?;
        let min_bars: usize = parse_or("MIN_BARS", get("MIN_BARS"), 50)?;
        if bar_limit < min_bars {
            return Err(ConfigError::Invalid {
                key: "BAR_LIMIT",
                reason: format!("{} is below MIN_BARS ({})", bar_limit, min_bars),
            });
        }

        let forced_cooldown_seconds: i64 =
            parse_or("FORCED_COOLDOWN_SECONDS", get("FORCED_COOLDOWN_SECONDS"), 900)?;
        if forced_cooldown_seconds < 0 {
            return Err(ConfigError::Invalid {
                key: "FORCED_COOLDOWN_SECONDS",
                reason: "must not be negative".to_string(),
            });
        }
        if forced_cooldown_seconds > MAX_FORCED_COOLDOWN_SECONDS {
            return Err(ConfigError::Invalid {
                key: "FORCED_COOLDOWN_SECONDS",
                reason: format!(
                    "{} exceeds the maximum of {}",
                    forced_cooldown_seconds, MAX_FORCED_COOLDOWN_SECONDS
                ),
            });
        }

        let cycle_interval_seconds: u64 =
            parse_or("CYCLE_INTERVAL_SECONDS", get("CYCLE_INTERVAL_SECONDS"), 600)?;
        cron_expression(cycle_interval_seconds).map_err(|e| ConfigError::Invalid {
            key: "CYCLE_INTERVAL_SECONDS",
            reason: e.to_string(),
        })?;

        let policy = match get("STRATEGY_CONFIG_PATH") {
            Some(path) => load_policy_file(PathBuf::from(path))?,
            None => {
                let variant = match get("STRATEGY_VARIANT") {
                    Some(raw) => StrategyVariant::from_str(&raw)?,
                    None => StrategyVariant::MeanReversionStrict,
                };
                let policy = ScoringPolicy::preset(variant);
                policy.validate()?;
                policy
            }
        };

        let telegram = match (get("TELEGRAM_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id,
                api_url: get("TELEGRAM_API_URL"),
            }),
            (Some(_), None) => return Err(ConfigError::Missing("TELEGRAM_CHAT_ID")),
            (None, Some(_)) => return Err(ConfigError::Missing("TELEGRAM_TOKEN")),
            (None, None) => None,
        };

        let headlines = get("CRYPTOPANIC_TOKEN").map(|auth_token| HeadlineConfig {
            auth_token,
            api_url: get("CRYPTOPANIC_API_URL"),
        });

        let macro_events = match get("MACRO_EVENTS") {
            Some(raw) => MacroEvent::parse_list(&raw).map_err(|reason| ConfigError::Invalid {
                key: "MACRO_EVENTS",
                reason,
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            environment: get("APP_ENV")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|| "sandbox".to_string()),
            watch_list,
            timeframe: get("TIMEFRAME").unwrap_or_else(|| "15m".to_string()),
            bar_limit,
            min_bars,
            cycle_interval_seconds,
            forced_cooldown_seconds,
            policy,
            http_port: parse_or("HTTP_PORT", get("HTTP_PORT"), 8080)?,
            kraken_api_url: get("KRAKEN_API_URL"),
            telegram,
            headlines,
            macro_events,
        })
    }
}

/// Split a comma-separated watch-list, keeping declaration order and
/// dropping blanks and repeats.
pub fn parse_watch_list(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

pub fn load_policy_file(path: PathBuf) -> Result<ScoringPolicy, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(ScoringPolicy::from_json(&raw)?)
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("{:?}: {}", value, e),
        }),
        None => Ok(default),
    }
}
