//! Observability for Poridhi.
//!
//! - **Logging**: structured `tracing` output via `tracing-subscriber`,
//!   JSON or pretty, filtered by `EnvFilter` directives
//! - **Metrics**: per-dispatch counters and latency via the `metrics` crate,
//!   optionally exported in Prometheus format
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `poridhi_requests_total` | Counter | `route`, `method`, `status` |
//! | `poridhi_request_duration_seconds` | Histogram | `route`, `method` |
//! | `poridhi_unhandled_faults_total` | Counter | `stage` |
//!
//! # Example
//!
//! ```rust,ignore
//! use poridhi_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::builder()
//!         .log_filter("info,poridhi_server=debug")
//!         .metrics_addr("0.0.0.0:9090")
//!         .build();
//!
//!     init_telemetry(&config).expect("telemetry");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/poridhi-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogOutput};
pub use metrics::{init_metrics, record_request, record_unhandled_fault, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
