//! Confluence signal worker
//!
//! Evaluates the watch-list on a fixed cadence and delivers at most one alert
//! per cycle. Serves /health and /metrics when HTTP_PORT is non-zero.

use confluence::config::AppConfig;
use confluence::core::http::{start_server, AppState, HealthStatus};
use confluence::core::runtime::SignalRuntime;
use confluence::core::scheduler::CycleScheduler;
use confluence::logging;
use confluence::metrics::Metrics;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env()?;
    info!(
        environment = %config.environment,
        watch_list = ?config.watch_list,
        timeframe = %config.timeframe,
        policy = %config.policy.name,
        interval = config.cycle_interval_seconds,
        "Starting confluence worker"
    );

    let metrics = Arc::new(Metrics::new()?);
    let health = Arc::new(RwLock::new(HealthStatus::default()));

    let runtime = SignalRuntime::from_config(&config)
        .with_metrics(metrics.clone())
        .with_health(health.clone());
    info!(dispatcher = runtime.dispatcher_name(), "Alert dispatcher ready");

    if config.http_port > 0 {
        let state = AppState {
            health: health.clone(),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
        };
        let port = config.http_port;
        tokio::spawn(async move {
            if let Err(e) = start_server(port, state).await {
                error!(error = %e, "HTTP server exited");
            }
        });
    }

    let scheduler = CycleScheduler::new(Arc::new(runtime), config.cycle_interval_seconds)?;
    scheduler.run_once().await;
    scheduler.start().await?;

    signal::ctrl_c().await?;
    info!("Shutdown signal received");
    scheduler.stop().await;

    Ok(())
}
