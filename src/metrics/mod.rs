// src/metrics/mod.rs
// Prometheus metrics for the agent runtime engine (spec §6 ambient stack).

use axum::{http::StatusCode, response::IntoResponse};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    PROMETHEUS_HANDLE
        .set(handle)
        .expect("Prometheus handle already initialized");

    info!("Prometheus metrics initialized");
}

/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics not initialized".to_string()),
    }
}

pub fn record_http_request(route: &str, status: u16) {
    counter!("negentropy_http_requests_total", "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
}

pub fn record_http_duration(route: &str, duration_seconds: f64) {
    histogram!("negentropy_http_request_duration_seconds", "route" => route.to_string()).record(duration_seconds);
}

pub fn record_event_appended(app_name: &str) {
    counter!("negentropy_events_appended_total", "app" => app_name.to_string()).increment(1);
}

pub fn record_memory_consolidated(app_name: &str) {
    counter!("negentropy_memories_consolidated_total", "app" => app_name.to_string()).increment(1);
}

pub fn record_memory_search(mode: &str, hit_count: usize) {
    counter!("negentropy_memory_searches_total", "mode" => mode.to_string()).increment(1);
    histogram!("negentropy_memory_search_hits", "mode" => mode.to_string()).record(hit_count as f64);
}

pub fn record_governance_decision(decision: &str) {
    counter!("negentropy_governance_decisions_total", "decision" => decision.to_string()).increment(1);
}

pub fn record_provider_call(provider: &str, success: bool, duration_seconds: f64) {
    let status = if success { "success" } else { "error" };
    counter!("negentropy_provider_calls_total", "provider" => provider.to_string(), "status" => status).increment(1);
    histogram!("negentropy_provider_call_duration_seconds", "provider" => provider.to_string()).record(duration_seconds);
}

pub fn record_ingestion_run(status: &str) {
    counter!("negentropy_ingestion_runs_total", "status" => status.to_string()).increment(1);
}

pub fn set_db_pool_in_use(count: u32) {
    gauge!("negentropy_db_pool_connections_in_use").set(count as f64);
}

/// Helper for timing an HTTP handler's execution.
pub struct RequestTimer {
    start: Instant,
    route: String,
}

impl RequestTimer {
    pub fn new(route: &str) -> Self {
        Self {
            start: Instant::now(),
            route: route.to_string(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        record_http_duration(&self.route, self.start.elapsed().as_secs_f64());
    }
}
