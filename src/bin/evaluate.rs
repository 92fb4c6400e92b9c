//! One-shot dry run: evaluate the watch-list once and print each verdict.
//!
//! Alerts go to the log instead of Telegram. Symbols passed as arguments
//! replace the configured watch-list.

use confluence::config::{parse_watch_list, AppConfig};
use confluence::core::runtime::SignalRuntime;
use confluence::logging;
use confluence::services::alerts::{format_signal_message, LogDispatcher};
use confluence::signals::selector::{AlertState, AssetStatus};
use dotenvy::dotenv;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging();

    let mut config = AppConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        config.watch_list = parse_watch_list(&args.join(","));
    }

    let runtime = SignalRuntime::from_config(&config).with_dispatcher(Arc::new(LogDispatcher));
    let report = runtime
        .run_cycle(AlertState::default(), chrono::Utc::now())
        .await;

    for outcome in &report.outcomes {
        let verdict = match &outcome.status {
            AssetStatus::Actionable {
                direction,
                confidence,
            } => format!("ACTIONABLE {} {:.0}", direction, confidence),
            AssetStatus::Watch {
                direction,
                confidence,
            } => format!("watch {} {:.0}", direction, confidence),
            AssetStatus::Hold => "hold".to_string(),
            AssetStatus::Failed(e) => format!("error: {}", e),
        };
        println!("{:<12} {:<8} {}", outcome.symbol, outcome.tier.as_str(), verdict);
    }

    match &report.signal {
        Some(signal) => println!("\n{}", format_signal_message(signal)),
        None => println!("\nNo signal this cycle"),
    }

    Ok(())
}
