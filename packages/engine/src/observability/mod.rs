// packages/engine/src/observability/mod.rs
//! Logging and metrics
//!
//! - **Tracing**: `tracing-subscriber` fmt layer, filtered by `RUST_LOG` or the
//!   configured level, optionally as JSON lines
//! - **Metrics**: counters and gauges exported through the Prometheus recorder

use crate::utils::config::ObservabilityConfig;
use crate::utils::errors::{EngineError, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Metric names emitted by the hardware
pub mod names {
    pub const THREADS_SPAWNED: &str = "signalgp_threads_spawned_total";
    pub const THREADS_ADMITTED: &str = "signalgp_threads_admitted_total";
    pub const THREADS_EVICTED: &str = "signalgp_threads_evicted_total";
    pub const THREADS_REJECTED: &str = "signalgp_threads_rejected_total";
    pub const EVENTS_DISPATCHED: &str = "signalgp_events_dispatched_total";
    pub const ACTIVE_THREADS: &str = "signalgp_active_threads";
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| EngineError::ObservabilityError(e.to_string()))
}

/// Install the Prometheus metrics recorder
///
/// Returns `None` when metrics are disabled in the configuration.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EngineError::ObservabilityError(e.to_string()))?;

    describe_counter!(names::THREADS_SPAWNED, "Threads allocated");
    describe_counter!(names::THREADS_ADMITTED, "Pending threads promoted to running");
    describe_counter!(names::THREADS_EVICTED, "Running threads preempted");
    describe_counter!(names::THREADS_REJECTED, "Pending threads dropped");
    describe_counter!(names::EVENTS_DISPATCHED, "Events handled");
    describe_gauge!(names::ACTIVE_THREADS, "Running threads after the last cycle");

    Ok(Some(handle))
}
