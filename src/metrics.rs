//! Prometheus metrics for the record store and the polling client.
//!
//! This module provides:
//! - Store mutation counters and rejection counts
//! - Per-action client request, failure and latency metrics

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Users created counter metric name.
pub const METRIC_USERS_CREATED: &str = "users_created_total";
/// Users updated counter metric name.
pub const METRIC_USERS_UPDATED: &str = "users_updated_total";
/// Users deleted counter metric name.
pub const METRIC_USERS_DELETED: &str = "users_deleted_total";
/// Rejected store operations counter metric name.
pub const METRIC_STORE_REJECTIONS: &str = "store_rejections_total";
/// Client requests counter metric name.
pub const METRIC_CLIENT_REQUESTS: &str = "client_requests_total";
/// Client failures counter metric name.
pub const METRIC_CLIENT_FAILURES: &str = "client_failures_total";
/// Client request latency metric name.
pub const METRIC_CLIENT_LATENCY: &str = "client_request_latency_ms";
/// Client scheduler cycles counter metric name.
pub const METRIC_CLIENT_CYCLES: &str = "client_cycles_total";

/// Initialize all metric descriptions.
/// Call this once at startup, after a recorder is installed.
pub fn init_metrics() {
    describe_counter!(METRIC_USERS_CREATED, "Total number of users created");
    describe_counter!(METRIC_USERS_UPDATED, "Total number of users updated");
    describe_counter!(METRIC_USERS_DELETED, "Total number of users deleted");
    describe_counter!(
        METRIC_STORE_REJECTIONS,
        "Store operations rejected, labelled by reason"
    );
    describe_counter!(
        METRIC_CLIENT_REQUESTS,
        "Outbound requests attempted by the polling client"
    );
    describe_counter!(
        METRIC_CLIENT_FAILURES,
        "Outbound requests that failed (transport or non-2xx)"
    );
    describe_histogram!(
        METRIC_CLIENT_LATENCY,
        "Polling client request latency in milliseconds"
    );
    describe_counter!(METRIC_CLIENT_CYCLES, "Scheduler ticks processed");

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Install the global Prometheus recorder with its own scrape listener.
pub fn install_listener(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    init_metrics();
    Ok(())
}

/// Increment users created counter.
pub fn inc_users_created() {
    counter!(METRIC_USERS_CREATED).increment(1);
}

/// Increment users updated counter.
pub fn inc_users_updated() {
    counter!(METRIC_USERS_UPDATED).increment(1);
}

/// Increment users deleted counter.
pub fn inc_users_deleted() {
    counter!(METRIC_USERS_DELETED).increment(1);
}

/// Increment store rejections counter.
pub fn inc_store_rejection(reason: &'static str) {
    counter!(METRIC_STORE_REJECTIONS, "reason" => reason).increment(1);
}

/// Increment client requests counter.
pub fn inc_client_requests(action: &str) {
    counter!(METRIC_CLIENT_REQUESTS, "action" => action.to_string()).increment(1);
}

/// Increment client failures counter.
pub fn inc_client_failures(action: &str) {
    counter!(METRIC_CLIENT_FAILURES, "action" => action.to_string()).increment(1);
}

/// Increment scheduler cycles counter.
pub fn inc_client_cycles() {
    counter!(METRIC_CLIENT_CYCLES).increment(1);
}

/// Record client request latency.
pub fn record_client_latency(start: Instant, action: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_CLIENT_LATENCY, "action" => action.to_string()).record(latency_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        inc_users_created();
        inc_store_rejection("not_found");
        record_client_latency(Instant::now(), "fetch");
    }
}
