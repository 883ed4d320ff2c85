//! Dispatch metrics for Poridhi.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `poridhi_requests_total` | Counter | `route`, `method`, `status` | Finalized responses |
//! | `poridhi_request_duration_seconds` | Histogram | `route`, `method` | Dispatch latency |
//! | `poridhi_unhandled_faults_total` | Counter | `stage` | Faults with no exception handler |
//!
//! Unmatched requests are labelled with the route `"<unmatched>"` so that
//! arbitrary paths never become label values.
//!
//! Without [`init_metrics`] the recording functions are no-ops.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Total finalized responses.
pub const REQUESTS_TOTAL: &str = "poridhi_requests_total";

/// Dispatch latency histogram.
pub const REQUEST_DURATION_SECONDS: &str = "poridhi_request_duration_seconds";

/// Faults that escaped with no exception handler.
pub const UNHANDLED_FAULTS_TOTAL: &str = "poridhi_unhandled_faults_total";

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address for the Prometheus scrape listener. `None` installs the
    /// recorder only; render it with [`render_metrics`].
    pub addr: Option<String>,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: None,
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// With an address, the scrape listener is spawned on the current tokio
/// runtime, so this must then be called from within one.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::Recorder` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let mut builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::Recorder(e.to_string()))?;

    let handle = match &config.addr {
        None => builder
            .install_recorder()
            .map_err(|e| TelemetryError::Recorder(e.to_string()))?,
        Some(addr) => {
            let addr = addr
                .parse::<SocketAddr>()
                .map_err(|e| TelemetryError::InvalidAddress {
                    addr: addr.clone(),
                    reason: e.to_string(),
                })?;
            builder = builder.with_http_listener(addr);

            let (recorder, exporter) = builder
                .build()
                .map_err(|e| TelemetryError::Recorder(e.to_string()))?;
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder)
                .map_err(|e| TelemetryError::Recorder(e.to_string()))?;

            tokio::spawn(async move {
                if let Err(e) = exporter.await {
                    tracing::error!(error = ?e, "prometheus listener stopped");
                }
            });
            tracing::info!(%addr, "prometheus listener started");
            handle
        }
    };

    let _ = METRICS_HANDLE.set(handle);
    describe_metrics();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for all standard metrics.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of responses finalized by the dispatcher");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time from receipt to finalized response"
    );
    describe_counter!(
        UNHANDLED_FAULTS_TOTAL,
        "Request faults that escaped because no exception handler was registered"
    );
}

/// Records a finalized response.
///
/// `route` is the matched template, or `None` for a request no route matched.
pub fn record_request(route: Option<&str>, method: &str, status_code: u16, duration: Duration) {
    let route = route.unwrap_or(UNMATCHED_ROUTE).to_string();

    counter!(
        REQUESTS_TOTAL,
        "route" => route.clone(),
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "route" => route,
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a fault that escaped the dispatcher.
pub fn record_unhandled_fault(stage: &'static str) {
    counter!(UNHANDLED_FAULTS_TOTAL, "stage" => stage).increment(1);
}
