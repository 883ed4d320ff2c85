//! Structured logging.
//!
//! One `tracing-subscriber` fmt layer, JSON or pretty, behind an
//! [`EnvFilter`] built from the configured directives.
//!
//! ```rust,ignore
//! use poridhi_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(route = "/books", "route registered");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human-readable.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,

    /// `EnvFilter` directives, e.g. `"info"` or `"poridhi_server=debug,warn"`.
    pub filter: String,

    /// Output rendering.
    pub output: LogOutput,

    /// Attach source file and line to each event.
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty output at debug level with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            filter: "debug".to_string(),
            output: LogOutput::Pretty,
            source_location: true,
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            filter: "info".to_string(),
            output: LogOutput::Json,
            source_location: false,
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails on invalid filter directives or when a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = parse_filter(&config.filter)?;

    let fmt = tracing_subscriber::fmt::layer()
        .with_file(config.source_location)
        .with_line_number(config.source_location);
    let fmt = match config.output {
        LogOutput::Json => fmt.json().boxed(),
        LogOutput::Pretty => fmt.pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInstalled(e.to_string()))
}

/// Parses `EnvFilter` directives.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] naming the rejected directives.
pub fn parse_filter(directives: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| TelemetryError::InvalidFilter {
        directives: directives.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LogConfig::default(), LogConfig::production());

        let dev = LogConfig::development();
        assert_eq!(dev.output, LogOutput::Pretty);
        assert!(dev.source_location);
        assert_eq!(dev.filter, "debug");

        let prod = LogConfig::production();
        assert_eq!(prod.output, LogOutput::Json);
        assert!(!prod.source_location);
    }

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("poridhi_server=debug,warn").is_ok());

        let err = parse_filter("poridhi=notalevel").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { directives, .. } if directives == "poridhi=notalevel"));
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = LogConfig {
            enabled: false,
            filter: "not a filter =".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
