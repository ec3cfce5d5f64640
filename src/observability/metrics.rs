//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): time to upstream response headers
//! - `proxy_upstream_errors_total` (counter): gateway failures by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::error::ProxyError;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_upstream_error(error: &ProxyError) {
    let kind = match error {
        ProxyError::UpstreamTimeout(_) => "timeout",
        ProxyError::UpstreamUnreachable(_) => "unreachable",
        ProxyError::InvalidUpstreamUri(_) => "invalid_uri",
        _ => "other",
    };
    metrics::counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}
