//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_refresh_total` (counter): refreshes by outcome
//! - `config_refresh_duration_seconds` (histogram): refresh latency
//! - `config_asset_size_failures_total` (counter): failed HEAD lookups by file
//! - `config_lookups_total` (counter): version lookups served
//! - `config_lookup_files` (histogram): files returned per lookup
//! - `config_document_last_updated_at` (gauge): timestamp of the live document
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_refresh(outcome: &'static str, started: Instant) {
    counter!("config_refresh_total", "outcome" => outcome).increment(1);
    histogram!("config_refresh_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_size_failure(file: &str) {
    counter!("config_asset_size_failures_total", "file" => file.to_string()).increment(1);
}

pub fn record_lookup(files: usize) {
    counter!("config_lookups_total").increment(1);
    histogram!("config_lookup_files").record(files as f64);
}

pub fn record_document(last_updated_at: u64) {
    gauge!("config_document_last_updated_at").set(last_updated_at as f64);
}
