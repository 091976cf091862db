//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define acceptor and worker pool metrics
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `acceptor_connections_accepted_total` (counter)
//! - `acceptor_accept_errors_total` (counter): by `kind` = ignorable | unexpected
//! - `dispatch_queue_depth` (gauge): contexts waiting for a worker
//! - `dispatch_queue_overflow_total` (counter): by `policy` = drop | reject
//! - `worker_requests_total` (counter): by `outcome` = ok | error | panic
//! - `worker_request_duration_seconds` (histogram)
//! - `worker_in_flight` (gauge)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::OverflowPolicy;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_accepted() {
    metrics::counter!("acceptor_connections_accepted_total").increment(1);
}

pub fn record_accept_error(ignorable: bool) {
    let kind = if ignorable { "ignorable" } else { "unexpected" };
    metrics::counter!("acceptor_accept_errors_total", "kind" => kind).increment(1);
}

pub fn record_queue_depth(depth: usize) {
    metrics::gauge!("dispatch_queue_depth").set(depth as f64);
}

pub fn record_overflow(policy: OverflowPolicy) {
    metrics::counter!("dispatch_queue_overflow_total", "policy" => policy.to_string()).increment(1);
}

pub fn record_request(outcome: &'static str, start: Instant) {
    metrics::counter!("worker_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("worker_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_in_flight(count: u64) {
    metrics::gauge!("worker_in_flight").set(count as f64);
}
