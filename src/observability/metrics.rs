//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define resolver metrics (cache behaviour, lookups, outcomes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `resolver_cache_hits_total` (counter)
//! - `resolver_cache_misses_total` (counter)
//! - `resolver_cache_evictions_total` (counter): expired entries dropped
//! - `resolver_lookups_total` (counter): resource lookups by kind
//! - `resolver_resolutions_total` (counter): resolutions by path and outcome
//! - `resolver_build_fallbacks_total` (counter): cluster build-plane retries
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Label values are static strings only

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

pub fn record_cache_hit() {
    ::metrics::counter!("resolver_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    ::metrics::counter!("resolver_cache_misses_total").increment(1);
}

pub fn record_cache_eviction() {
    ::metrics::counter!("resolver_cache_evictions_total").increment(1);
}

/// Record one resource lookup against the backing API.
pub fn record_lookup(kind: &'static str) {
    ::metrics::counter!("resolver_lookups_total", "kind" => kind).increment(1);
}

/// Record the outcome of a resolution (`path` is "environment" or "build").
pub fn record_resolution(path: &'static str, outcome: &'static str) {
    ::metrics::counter!("resolver_resolutions_total", "path" => path, "outcome" => outcome)
        .increment(1);
}

pub fn record_build_fallback() {
    ::metrics::counter!("resolver_build_fallbacks_total").increment(1);
}
