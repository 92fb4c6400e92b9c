//! Cycle orchestration and the HTTP surface

pub mod http;
pub mod runtime;
pub mod scheduler;

pub use http::{create_router, start_server, AppState, HealthStatus};
pub use runtime::SignalRuntime;
pub use scheduler::{cron_expression, CycleScheduler};
