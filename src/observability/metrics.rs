//! Admission metrics.
//!
//! Counters use a small fixed label set (outcome kind, status class) so
//! cardinality stays bounded regardless of traffic shape.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Failure to bind is surfaced to the
/// caller; the gateway can run without metrics but not silently.
pub fn init_metrics(address: SocketAddr) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;
    tracing::info!(%address, "Metrics exporter listening");
    Ok(())
}

/// A request passed the full admission chain.
pub fn record_admitted() {
    counter!("gateway_requests_admitted_total").increment(1);
}

/// A request was rejected, labeled by the rejection kind.
pub fn record_rejection(kind: &'static str) {
    counter!("gateway_requests_rejected_total", "kind" => kind).increment(1);
}

/// A request hit the rate limiter specifically.
pub fn record_rate_limited() {
    counter!("gateway_rate_limited_total").increment(1);
}

/// A login attempt completed, labeled by outcome.
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("gateway_logins_total", "outcome" => outcome).increment(1);
}
