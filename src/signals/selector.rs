//! Watch-list selection: primary tier first, forced tier under a cooldown,
//! at most one signal per cycle.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::models::indicators::Candle;
use crate::models::signal::{Signal, SignalDirection, Tier};
use crate::services::alerts::AlertDispatcher;
use crate::services::fundamental::{FilterDecision, FundamentalFilter};
use crate::services::market_data::ProviderResolver;
use crate::signals::engine::{EvaluationError, SignalEngine};
use crate::signals::scoring::Verdict;

pub const DEFAULT_FORCED_COOLDOWN_SECONDS: i64 = 900;

/// State carried between cycles. Only the selector updates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    pub last_forced_signal_time: Option<DateTime<Utc>>,
}

impl AlertState {
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_forced_signal_time {
            None => true,
            Some(last) => now - last >= cooldown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPhase {
    Idle,
    EvaluatingPrimary,
    EvaluatingForced,
    Dispatched,
}

#[derive(Debug)]
pub enum AssetStatus {
    Actionable {
        direction: SignalDirection,
        confidence: f64,
    },
    Watch {
        direction: SignalDirection,
        confidence: f64,
    },
    Hold,
    Failed(EvaluationError),
}

#[derive(Debug)]
pub struct AssetOutcome {
    pub symbol: String,
    pub tier: Tier,
    pub status: AssetStatus,
}

/// What happened during one cycle, including the state to carry forward.
#[derive(Debug)]
pub struct CycleReport {
    pub state: AlertState,
    pub phases: Vec<SelectorPhase>,
    pub outcomes: Vec<AssetOutcome>,
    /// The signal chosen for dispatch, if any.
    pub signal: Option<Signal>,
    pub delivered: bool,
    pub dispatch_error: Option<String>,
    pub forced_on_cooldown: bool,
}

impl CycleReport {
    fn new(state: AlertState) -> Self {
        Self {
            state,
            phases: vec![SelectorPhase::Idle],
            outcomes: Vec::new(),
            signal: None,
            delivered: false,
            dispatch_error: None,
            forced_on_cooldown: false,
        }
    }

    pub fn final_phase(&self) -> SelectorPhase {
        self.phases.last().copied().unwrap_or(SelectorPhase::Idle)
    }

    pub fn fetch_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, AssetStatus::Failed(EvaluationError::Fetch(_))))
            .count()
    }
}

/// Collaborators a cycle talks to.
pub struct CycleDeps<'a> {
    pub providers: &'a ProviderResolver,
    pub dispatcher: &'a dyn AlertDispatcher,
    pub filter: Option<&'a dyn FundamentalFilter>,
}

pub struct SignalSelector {
    engine: SignalEngine,
    watch_list: Vec<String>,
    timeframe: String,
    bar_limit: usize,
    forced_cooldown: Duration,
}

impl SignalSelector {
    pub fn new(engine: SignalEngine, watch_list: Vec<String>, timeframe: impl Into<String>) -> Self {
        Self {
            engine,
            watch_list,
            timeframe: timeframe.into(),
            bar_limit: 100,
            forced_cooldown: Duration::seconds(DEFAULT_FORCED_COOLDOWN_SECONDS),
        }
    }

    pub fn with_bar_limit(mut self, bar_limit: usize) -> Self {
        self.bar_limit = bar_limit;
        self
    }

    pub fn with_forced_cooldown(mut self, cooldown: Duration) -> Self {
        self.forced_cooldown = cooldown;
        self
    }

    pub fn watch_list(&self) -> &[String] {
        &self.watch_list
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn forced_cooldown(&self) -> Duration {
        self.forced_cooldown
    }

    /// Run one evaluation cycle over the watch-list in declaration order.
    ///
    /// The first primary-tier qualifier is dispatched and ends the cycle. With
    /// none, and the forced cooldown elapsed, the series already fetched this
    /// cycle are re-scored under the forced tier and the first qualifier is
    /// dispatched, stamping `last_forced_signal_time`.
    pub async fn run_cycle(
        &self,
        deps: &CycleDeps<'_>,
        state: AlertState,
        now: DateTime<Utc>,
    ) -> CycleReport {
        let mut report = CycleReport::new(state);
        let mut fetched: Vec<(&str, Vec<Candle>)> = Vec::new();

        report.phases.push(SelectorPhase::EvaluatingPrimary);
        for symbol in &self.watch_list {
            let candles = match self.load(symbol, deps, now).await {
                Ok(candles) => candles,
                Err(e) => {
                    log_failure(symbol, Tier::Primary, &e);
                    report.outcomes.push(AssetOutcome {
                        symbol: symbol.clone(),
                        tier: Tier::Primary,
                        status: AssetStatus::Failed(e),
                    });
                    continue;
                }
            };

            if let Some(signal) = self.score(symbol, &candles, Tier::Primary, now, &mut report) {
                self.dispatch(signal, deps, &mut report).await;
                return report;
            }
            let evaluated = !matches!(
                report.outcomes.last().map(|o| &o.status),
                Some(AssetStatus::Failed(_))
            );
            if evaluated {
                fetched.push((symbol, candles));
            }
        }

        if !report.state.cooldown_elapsed(now, self.forced_cooldown) {
            debug!(
                last_forced = ?report.state.last_forced_signal_time,
                "SignalSelector: no primary signal, forced tier on cooldown"
            );
            report.forced_on_cooldown = true;
            report.phases.push(SelectorPhase::Idle);
            return report;
        }

        report.phases.push(SelectorPhase::EvaluatingForced);
        for (symbol, candles) in &fetched {
            if let Some(signal) = self.score(symbol, candles, Tier::Forced, now, &mut report) {
                report.state.last_forced_signal_time = Some(now);
                self.dispatch(signal, deps, &mut report).await;
                return report;
            }
        }

        debug!("SignalSelector: no asset qualified under either tier");
        report.phases.push(SelectorPhase::Idle);
        report
    }

    async fn load(
        &self,
        symbol: &str,
        deps: &CycleDeps<'_>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Candle>, EvaluationError> {
        if let Some(filter) = deps.filter {
            if let FilterDecision::Block(reason) = filter.check(symbol, now).await {
                return Err(EvaluationError::Blocked { reason });
            }
        }
        let provider = deps.providers.resolve(symbol)?;
        Ok(provider.fetch(symbol, &self.timeframe, self.bar_limit).await?)
    }

    /// Score one asset, record the outcome and return the signal if it qualifies.
    fn score(
        &self,
        symbol: &str,
        candles: &[Candle],
        tier: Tier,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Option<Signal> {
        let (status, signal) = match self.engine.evaluate(symbol, candles, tier, now) {
            Ok(evaluation) => {
                let direction = evaluation.scorecard.direction;
                let confidence = evaluation.scorecard.confidence;
                match evaluation.verdict {
                    Verdict::Actionable => (
                        AssetStatus::Actionable {
                            direction,
                            confidence,
                        },
                        Some(evaluation.signal),
                    ),
                    Verdict::Watch => {
                        info!(
                            symbol = %symbol,
                            tier = %tier,
                            direction = %direction,
                            confidence = confidence,
                            "SignalSelector: watch advisory for {} ({} {:.0})",
                            symbol,
                            direction,
                            confidence
                        );
                        (
                            AssetStatus::Watch {
                                direction,
                                confidence,
                            },
                            None,
                        )
                    }
                    Verdict::Hold => {
                        debug!(
                            symbol = %symbol,
                            tier = %tier,
                            confidence = confidence,
                            hold_reason = ?evaluation.scorecard.hold_reason,
                            "SignalSelector: hold"
                        );
                        (AssetStatus::Hold, None)
                    }
                }
            }
            Err(e) => {
                log_failure(symbol, tier, &e);
                (AssetStatus::Failed(e), None)
            }
        };

        report.outcomes.push(AssetOutcome {
            symbol: symbol.to_string(),
            tier,
            status,
        });
        signal
    }

    async fn dispatch(&self, signal: Signal, deps: &CycleDeps<'_>, report: &mut CycleReport) {
        match deps.dispatcher.dispatch(&signal).await {
            Ok(()) => {
                info!(
                    symbol = %signal.asset,
                    direction = %signal.direction,
                    tier = %signal.tier,
                    confidence = signal.confidence,
                    dispatcher = deps.dispatcher.name(),
                    "SignalSelector: dispatched {} {} ({} tier, confidence {:.0})",
                    signal.direction,
                    signal.asset,
                    signal.tier,
                    signal.confidence
                );
                report.delivered = true;
            }
            Err(e) => {
                error!(
                    symbol = %signal.asset,
                    error = %e,
                    dispatcher = deps.dispatcher.name(),
                    "SignalSelector: failed to dispatch signal for {}",
                    signal.asset
                );
                report.dispatch_error = Some(e.to_string());
            }
        }
        report.signal = Some(signal);
        report.phases.push(SelectorPhase::Dispatched);
    }
}

fn log_failure(symbol: &str, tier: Tier, error: &EvaluationError) {
    match error {
        EvaluationError::InsufficientData { .. } => {
            debug!(symbol = %symbol, tier = %tier, error = %error, "SignalSelector: skipping asset");
        }
        EvaluationError::Blocked { .. } => {
            info!(symbol = %symbol, tier = %tier, error = %error, "SignalSelector: asset blocked");
        }
        EvaluationError::Fetch(_) | EvaluationError::InvalidSeries(_) => {
            warn!(symbol = %symbol, tier = %tier, error = %error, "SignalSelector: asset evaluation failed");
        }
    }
}
