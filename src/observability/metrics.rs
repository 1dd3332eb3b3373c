//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cm2http_watch_subscriptions_total` (counter): watches established
//! - `cm2http_watch_events_total` (counter): events received, by kind
//! - `cm2http_snapshot_updates_total` (counter): reconciliation outcomes
//! - `cm2http_snapshot_keys` (gauge): keys currently served
//! - `cm2http_http_requests_total` (counter): requests by route
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_subscription() {
    counter!("cm2http_watch_subscriptions_total").increment(1);
}

pub fn record_watch_event(kind: &'static str) {
    counter!("cm2http_watch_events_total", "kind" => kind).increment(1);
}

pub fn record_snapshot_update(outcome: &'static str, keys: usize) {
    counter!("cm2http_snapshot_updates_total", "outcome" => outcome).increment(1);
    gauge!("cm2http_snapshot_keys").set(keys as f64);
}

pub fn record_request(route: &'static str) {
    counter!("cm2http_http_requests_total", "route" => route).increment(1);
}
