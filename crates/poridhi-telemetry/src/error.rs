//! Telemetry error types.

use thiserror::Error;

/// Why telemetry could not be initialized.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directives did not parse.
    #[error("invalid log filter '{directives}': {reason}")]
    InvalidFilter {
        /// The rejected directives.
        directives: String,
        /// Parser message.
        reason: String,
    },

    /// Another global subscriber was installed first.
    #[error("logging already initialized: {0}")]
    SubscriberInstalled(String),

    /// The Prometheus recorder or exporter could not be set up.
    #[error("metrics setup failed: {0}")]
    Recorder(String),

    /// The metrics listener address did not parse.
    #[error("invalid metrics address '{addr}': {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parser message.
        reason: String,
    },
}
