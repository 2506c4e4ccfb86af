//! Metrics collection and exposition.
//!
//! # Metrics
//! - `composer_updates_total` (counter): updates by feature and outcome
//! - `composer_compose_duration_seconds` (histogram): composition latency
//! - `composer_revision` (gauge): last committed store revision
//! - `composer_subscribers` (gauge): registered store subscribers

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::features::FeatureId;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_update(feature: FeatureId, outcome: &'static str) {
    metrics::counter!(
        "composer_updates_total",
        "feature" => feature.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_compose_duration(started: Instant) {
    metrics::histogram!("composer_compose_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

pub fn record_revision(revision: u64) {
    metrics::gauge!("composer_revision").set(revision as f64);
}

pub fn record_subscribers(count: usize) {
    metrics::gauge!("composer_subscribers").set(count as f64);
}
