//! Unit tests for watch-list selection across tiers

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use confluence::models::signal::{SignalDirection, Tier};
use confluence::services::fundamental::{FilterDecision, FundamentalFilter};
use confluence::services::market_data::{FetchError, ProviderResolver};
use confluence::signals::engine::{EvaluationError, SignalEngine};
use confluence::signals::scoring::Verdict;
use confluence::signals::selector::{
    AlertState, AssetStatus, CycleDeps, SelectorPhase, SignalSelector,
};
use std::sync::Arc;

use crate::support::{
    falling, flat, forced_only_policy, permissive_policy, rising, t0, RecordingDispatcher,
    StaticProvider,
};

fn watch(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

fn selector(policy: confluence::models::policy::ScoringPolicy, symbols: &[&str]) -> SignalSelector {
    SignalSelector::new(SignalEngine::new(policy), watch(symbols), "15m")
}

struct BlockSymbol(&'static str);

#[async_trait]
impl FundamentalFilter for BlockSymbol {
    async fn check(&self, symbol: &str, _now: DateTime<Utc>) -> FilterDecision {
        if symbol == self.0 {
            FilterDecision::Block("CPI release".to_string())
        } else {
            FilterDecision::Allow
        }
    }
}

#[test]
fn cooldown_elapses_after_configured_gap() {
    let cooldown = Duration::minutes(15);
    assert!(AlertState::default().cooldown_elapsed(t0(), cooldown));

    let state = AlertState {
        last_forced_signal_time: Some(t0()),
    };
    assert!(!state.cooldown_elapsed(t0() + Duration::minutes(10), cooldown));
    assert!(state.cooldown_elapsed(t0() + Duration::minutes(15), cooldown));
    assert!(state.cooldown_elapsed(t0() + Duration::minutes(20), cooldown));
}

#[tokio::test]
async fn first_primary_qualifier_in_watch_list_order_is_the_only_dispatch() {
    let provider = Arc::new(
        StaticProvider::new()
            .with("ETH/USD", flat(60, 100.0))
            .with("BTC/USD", falling(60, 200.0, 1.0))
            .with("SOL/USD", rising(60, 20.0, 0.1)),
    );
    let dispatcher = RecordingDispatcher::new();
    let resolver = ProviderResolver::new(provider.clone());
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };

    let report = selector(permissive_policy(), &["ETH/USD", "BTC/USD", "SOL/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].asset, "BTC/USD");
    assert_eq!(sent[0].direction, SignalDirection::Buy);
    assert_eq!(sent[0].tier, Tier::Primary);
    assert!(report.delivered);
    assert_eq!(report.state, AlertState::default());
    assert_eq!(
        report.phases,
        vec![
            SelectorPhase::Idle,
            SelectorPhase::EvaluatingPrimary,
            SelectorPhase::Dispatched
        ]
    );
    // The cycle stops at the first qualifier.
    assert_eq!(provider.call_count("SOL/USD"), 0);
    assert!(matches!(report.outcomes[0].status, AssetStatus::Hold));
    assert!(matches!(report.outcomes[1].status, AssetStatus::Actionable { .. }));
}

#[tokio::test]
async fn three_primary_qualifiers_yield_one_dispatch() {
    let series = [
        ("ETH/USD", falling(60, 3_500.0, 5.0)),
        ("BTC/USD", rising(60, 60_000.0, 50.0)),
        ("SOL/USD", falling(60, 150.0, 0.5)),
    ];
    let engine = SignalEngine::new(permissive_policy());
    for (symbol, candles) in &series {
        let evaluation = engine.evaluate(symbol, candles, Tier::Primary, t0()).unwrap();
        assert_eq!(evaluation.verdict, Verdict::Actionable, "{} should qualify", symbol);
    }

    let provider = Arc::new(
        series
            .iter()
            .fold(StaticProvider::new(), |p, (symbol, candles)| p.with(symbol, candles.clone())),
    );
    let dispatcher = RecordingDispatcher::new();
    let resolver = ProviderResolver::new(provider.clone());
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };

    let report = selector(permissive_policy(), &["ETH/USD", "BTC/USD", "SOL/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].asset, "ETH/USD");
    assert_eq!(dispatcher.attempts(), 1);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(provider.calls(), vec!["ETH/USD".to_string()]);
    assert_eq!(report.final_phase(), SelectorPhase::Dispatched);
}

#[tokio::test]
async fn forced_tier_reuses_fetched_series_and_stamps_state() {
    let provider = Arc::new(
        StaticProvider::new()
            .with("ETH/USD", flat(60, 100.0))
            .with("BTC/USD", falling(60, 200.0, 1.0)),
    );
    let dispatcher = RecordingDispatcher::new();
    let resolver = ProviderResolver::new(provider.clone());
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };
    let now = t0();

    let report = selector(forced_only_policy(), &["ETH/USD", "BTC/USD"])
        .run_cycle(&deps, AlertState::default(), now)
        .await;

    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].asset, "BTC/USD");
    assert_eq!(sent[0].tier, Tier::Forced);
    assert_eq!(report.state.last_forced_signal_time, Some(now));
    assert_eq!(report.final_phase(), SelectorPhase::Dispatched);
    assert!(report.phases.contains(&SelectorPhase::EvaluatingForced));
    assert_eq!(provider.call_count("BTC/USD"), 1);
    assert_eq!(provider.call_count("ETH/USD"), 1);
}

#[tokio::test]
async fn forced_tier_waits_out_cooldown() {
    let provider = Arc::new(StaticProvider::new().with("BTC/USD", falling(60, 200.0, 1.0)));
    let resolver = ProviderResolver::new(provider);
    let selector = selector(forced_only_policy(), &["BTC/USD"]);
    let last = t0();
    let state = AlertState {
        last_forced_signal_time: Some(last),
    };

    let dispatcher = RecordingDispatcher::new();
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };
    let early = selector
        .run_cycle(&deps, state.clone(), last + Duration::minutes(10))
        .await;
    assert!(dispatcher.sent().is_empty());
    assert!(early.forced_on_cooldown);
    assert_eq!(early.state, state);
    assert_eq!(early.final_phase(), SelectorPhase::Idle);

    let later_at = last + Duration::minutes(20);
    let later = selector.run_cycle(&deps, state, later_at).await;
    assert_eq!(dispatcher.sent().len(), 1);
    assert_eq!(later.state.last_forced_signal_time, Some(later_at));
}

#[tokio::test]
async fn primary_tier_ignores_forced_cooldown() {
    let provider = Arc::new(StaticProvider::new().with("BTC/USD", falling(60, 200.0, 1.0)));
    let resolver = ProviderResolver::new(provider);
    let dispatcher = RecordingDispatcher::new();
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };
    let state = AlertState {
        last_forced_signal_time: Some(t0()),
    };

    let report = selector(permissive_policy(), &["BTC/USD"])
        .run_cycle(&deps, state.clone(), t0() + Duration::minutes(1))
        .await;
    assert_eq!(dispatcher.sent().len(), 1);
    assert_eq!(report.state, state);
}

#[tokio::test]
async fn failed_delivery_still_consumes_forced_cooldown() {
    let provider = Arc::new(StaticProvider::new().with("BTC/USD", falling(60, 200.0, 1.0)));
    let resolver = ProviderResolver::new(provider);
    let dispatcher = RecordingDispatcher::failing();
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };

    let report = selector(forced_only_policy(), &["BTC/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    assert_eq!(dispatcher.attempts(), 1);
    assert!(!report.delivered);
    assert!(report.dispatch_error.is_some());
    assert!(report.signal.is_some());
    assert_eq!(report.state.last_forced_signal_time, Some(t0()));
}

#[tokio::test]
async fn failing_assets_are_skipped() {
    let provider = Arc::new(
        StaticProvider::new()
            .with("DOGE/USD", falling(10, 1.0, 0.001))
            .with("BTC/USD", falling(60, 200.0, 1.0)),
    );
    let resolver = ProviderResolver::new(provider);
    let dispatcher = RecordingDispatcher::new();
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };

    let report = selector(permissive_policy(), &["XRP/USD", "DOGE/USD", "BTC/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    assert!(matches!(
        report.outcomes[0].status,
        AssetStatus::Failed(EvaluationError::Fetch(FetchError::Api(_)))
    ));
    assert!(matches!(
        report.outcomes[1].status,
        AssetStatus::Failed(EvaluationError::InsufficientData { got: 10, .. })
    ));
    assert_eq!(report.fetch_failures(), 1);
    assert_eq!(dispatcher.sent()[0].asset, "BTC/USD");
}

#[tokio::test]
async fn blocked_assets_are_not_fetched() {
    let provider = Arc::new(
        StaticProvider::new()
            .with("BTC/USD", falling(60, 200.0, 1.0))
            .with("ETH/USD", falling(60, 100.0, 0.5)),
    );
    let resolver = ProviderResolver::new(provider.clone());
    let dispatcher = RecordingDispatcher::new();
    let filter = BlockSymbol("BTC/USD");
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: Some(&filter),
    };

    let report = selector(permissive_policy(), &["BTC/USD", "ETH/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    assert_eq!(provider.call_count("BTC/USD"), 0);
    assert!(matches!(
        &report.outcomes[0].status,
        AssetStatus::Failed(EvaluationError::Blocked { reason }) if reason == "CPI release"
    ));
    assert_eq!(dispatcher.sent()[0].asset, "ETH/USD");
}

#[tokio::test]
async fn unresolvable_symbols_end_idle() {
    let resolver = ProviderResolver::empty();
    let dispatcher = RecordingDispatcher::new();
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };

    let report = selector(permissive_policy(), &["BTC/USD", "ETH/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    assert!(report.signal.is_none());
    assert_eq!(dispatcher.attempts(), 0);
    assert_eq!(report.fetch_failures(), 2);
    assert_eq!(report.final_phase(), SelectorPhase::Idle);
    assert!(report.outcomes.iter().all(|o| matches!(
        o.status,
        AssetStatus::Failed(EvaluationError::Fetch(FetchError::NoProvider(_)))
    )));
}

#[tokio::test]
async fn quiet_market_dispatches_nothing() {
    let provider = Arc::new(
        StaticProvider::new()
            .with("BTC/USD", flat(60, 100.0))
            .with("ETH/USD", flat(60, 50.0)),
    );
    let resolver = ProviderResolver::new(provider);
    let dispatcher = RecordingDispatcher::new();
    let deps = CycleDeps {
        providers: &resolver,
        dispatcher: &dispatcher,
        filter: None,
    };

    let report = selector(forced_only_policy(), &["BTC/USD", "ETH/USD"])
        .run_cycle(&deps, AlertState::default(), t0())
        .await;

    assert!(report.signal.is_none());
    assert_eq!(report.state, AlertState::default());
    assert_eq!(
        report.phases,
        vec![
            SelectorPhase::Idle,
            SelectorPhase::EvaluatingPrimary,
            SelectorPhase::EvaluatingForced,
            SelectorPhase::Idle
        ]
    );
    // Two primary and two forced outcomes.
    assert_eq!(report.outcomes.len(), 4);
}
