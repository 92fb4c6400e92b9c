//! Cron-driven cycle scheduler

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::core::runtime::SignalRuntime;
use crate::signals::selector::AlertState;

/// Convert an interval into a six-field cron expression
/// (`second minute hour day month weekday`).
///
/// Step fields restart at each minute, hour or day boundary, so only
/// intervals that divide the enclosing unit evenly are accepted.
pub fn cron_expression(interval_seconds: u64) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let unrepresentable = || -> Box<dyn std::error::Error + Send + Sync> {
        format!(
            "Interval {}s has no exact cron form; use a divisor of 60s, 60min or 24h, or exactly 1 day",
            interval_seconds
        )
        .into()
    };

    match interval_seconds {
        0 => Err("Scheduler disabled: interval_seconds is 0".into()),
        s if s < 60 => {
            if 60 % s == 0 {
                Ok(format!("*/{} * * * * *", s))
            } else {
                Err(unrepresentable())
            }
        }
        s if s < 3600 => {
            if s % 60 == 0 && 60 % (s / 60) == 0 {
                Ok(format!("0 */{} * * * *", s / 60))
            } else {
                Err(unrepresentable())
            }
        }
        s if s < 86_400 => {
            if s % 3600 == 0 && 24 % (s / 3600) == 0 {
                Ok(format!("0 0 */{} * * *", s / 3600))
            } else {
                Err(unrepresentable())
            }
        }
        86_400 => Ok("0 0 0 * * *".to_string()),
        _ => Err(unrepresentable()),
    }
}

/// Runs one evaluation cycle per cron tick. The alert state lives here
/// between cycles.
pub struct CycleScheduler {
    runtime: Arc<SignalRuntime>,
    schedule: Schedule,
    state: Arc<RwLock<AlertState>>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl CycleScheduler {
    pub fn new(
        runtime: Arc<SignalRuntime>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let cron_expr = cron_expression(interval_seconds)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "CycleScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            runtime,
            schedule,
            state: Arc::new(RwLock::new(AlertState::default())),
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Run a single cycle immediately against the held state.
    pub async fn run_once(&self) {
        run_tick(&self.runtime, &self.state).await;
    }

    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let runtime = self.runtime.clone();
        let schedule = self.schedule.clone();
        let state = self.state.clone();

        let handle = tokio::spawn(async move {
            info!("CycleScheduler: started, waiting for cron schedule...");

            loop {
                let next_tick = schedule.upcoming(chrono::Utc).next();
                match next_tick {
                    Some(next_tick) => {
                        let now = chrono::Utc::now();
                        if next_tick > now {
                            let duration = (next_tick - now).to_std().unwrap_or_default();
                            tokio::time::sleep(duration).await;
                        }
                    }
                    None => {
                        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        continue;
                    }
                }

                run_tick(&runtime, &state).await;
            }
        });

        {
            let mut h = self.handle.write().await;
            *h = Some(handle);
        }

        info!("CycleScheduler: started successfully");
        Ok(())
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("CycleScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }

    pub async fn state(&self) -> AlertState {
        self.state.read().await.clone()
    }
}

async fn run_tick(runtime: &SignalRuntime, state: &RwLock<AlertState>) {
    // Held across the cycle so a manual run_once cannot interleave with a tick.
    let mut state = state.write().await;
    let report = runtime.run_cycle(state.clone(), chrono::Utc::now()).await;
    *state = report.state;
}
