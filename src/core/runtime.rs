//! Wires the selector to its collaborators and records cycle outcomes.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{AppConfig, MAX_FORCED_COOLDOWN_SECONDS};
use crate::core::http::HealthStatus;
use crate::metrics::Metrics;
use crate::services::alerts::{AlertDispatcher, LogDispatcher, TelegramDispatcher};
use crate::services::fundamental::{CryptoPanicHeadlines, FundamentalFilter, MacroCalendarFilter};
use crate::services::kraken::KrakenMarketDataProvider;
use crate::services::market_data::ProviderResolver;
use crate::signals::engine::SignalEngine;
use crate::signals::selector::{AlertState, CycleDeps, CycleReport, SignalSelector};

pub struct SignalRuntime {
    selector: SignalSelector,
    providers: ProviderResolver,
    dispatcher: Arc<dyn AlertDispatcher>,
    filter: Option<Arc<dyn FundamentalFilter>>,
    metrics: Option<Arc<Metrics>>,
    health: Option<Arc<RwLock<HealthStatus>>>,
}

impl SignalRuntime {
    pub fn new(
        selector: SignalSelector,
        providers: ProviderResolver,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        Self {
            selector,
            providers,
            dispatcher,
            filter: None,
            metrics: None,
            health: None,
        }
    }

    /// Build the production wiring: Kraken candles, Telegram delivery when
    /// configured (log-only otherwise), and the macro/headline filter when
    /// any events or a headline token are present.
    pub fn from_config(config: &AppConfig) -> Self {
        let engine = SignalEngine::new(config.policy.clone()).with_min_candles(config.min_bars);
        let selector = SignalSelector::new(engine, config.watch_list.clone(), config.timeframe.clone())
            .with_bar_limit(config.bar_limit)
            .with_forced_cooldown(Duration::seconds(
                config
                    .forced_cooldown_seconds
                    .clamp(0, MAX_FORCED_COOLDOWN_SECONDS),
            ));

        let kraken = match &config.kraken_api_url {
            Some(url) => KrakenMarketDataProvider::with_base_url(url.clone()),
            None => KrakenMarketDataProvider::new(),
        };
        let providers = ProviderResolver::new(Arc::new(kraken));

        let dispatcher: Arc<dyn AlertDispatcher> = match &config.telegram {
            Some(telegram) => match &telegram.api_url {
                Some(url) => Arc::new(TelegramDispatcher::with_base_url(
                    url.clone(),
                    telegram.token.clone(),
                    telegram.chat_id.clone(),
                )),
                None => Arc::new(TelegramDispatcher::new(
                    telegram.token.clone(),
                    telegram.chat_id.clone(),
                )),
            },
            None => Arc::new(LogDispatcher),
        };

        let mut runtime = Self::new(selector, providers, dispatcher);

        if !config.macro_events.is_empty() || config.headlines.is_some() {
            let mut filter = MacroCalendarFilter::new(config.macro_events.clone());
            if let Some(headlines) = &config.headlines {
                let source = match &headlines.api_url {
                    Some(url) => CryptoPanicHeadlines::with_base_url(url.clone(), headlines.auth_token.clone()),
                    None => CryptoPanicHeadlines::new(headlines.auth_token.clone()),
                };
                filter = filter.with_headlines(Arc::new(source));
            }
            runtime = runtime.with_filter(Arc::new(filter));
        }

        runtime
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn FundamentalFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_health(mut self, health: Arc<RwLock<HealthStatus>>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn selector(&self) -> &SignalSelector {
        &self.selector
    }

    pub fn dispatcher_name(&self) -> &str {
        self.dispatcher.name()
    }

    /// Run one cycle and return its report; the caller keeps `report.state`.
    pub async fn run_cycle(&self, state: AlertState, now: DateTime<Utc>) -> CycleReport {
        let started = Instant::now();
        info!(
            assets = self.selector.watch_list().len(),
            "SignalRuntime: cycle started"
        );

        let deps = CycleDeps {
            providers: &self.providers,
            dispatcher: self.dispatcher.as_ref(),
            filter: self.filter.as_deref(),
        };
        let report = self.selector.run_cycle(&deps, state, now).await;
        let elapsed = started.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics.cycles_total.inc();
            metrics.cycle_duration_seconds.observe(elapsed.as_secs_f64());
            metrics.fetch_errors_total.inc_by(report.fetch_failures() as u64);
            metrics.last_cycle_timestamp.set(now.timestamp() as f64);
            if let Some(signal) = &report.signal {
                metrics.record_dispatch(signal.tier);
            }
            if report.dispatch_error.is_some() {
                metrics.dispatch_errors_total.inc();
            }
        }

        if let Some(health) = &self.health {
            let mut health = health.write().await;
            health.cycles_completed += 1;
            health.last_cycle_at = Some(now);
            if report.delivered {
                health.last_signal = report.signal.clone();
            }
        }

        info!(
            duration_ms = elapsed.as_millis(),
            signal = report.signal.as_ref().map(|s| s.asset.as_str()).unwrap_or("none"),
            delivered = report.delivered,
            forced_on_cooldown = report.forced_on_cooldown,
            "SignalRuntime: cycle finished"
        );
        report
    }
}
