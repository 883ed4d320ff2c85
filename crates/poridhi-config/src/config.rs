//! Main configuration types.
//!
//! This module provides the top-level [`PoridhiConfig`] struct.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, MetricsConfig, ServerConfig, TemplatesConfig};

/// Complete Poridhi application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use poridhi_config::PoridhiConfig;
///
/// let config = PoridhiConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.templates.directory, "templates");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PoridhiConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Template configuration.
    #[serde(default)]
    pub templates: TemplatesConfig,
}

impl PoridhiConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the server address is not a socket address
    /// - metrics are enabled with an unparsable listener address
    /// - the log level is empty
    /// - the template directory is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if let (true, Some(addr)) = (self.metrics.enabled, &self.metrics.addr) {
            if addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::invalid(
                    "metrics.addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "must not be empty"));
        }

        if self.templates.directory.trim().is_empty() {
            return Err(ConfigError::invalid(
                "templates.directory",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Creates a development configuration preset.
    ///
    /// Binds to localhost, logs at debug level in pretty format with source
    /// locations, and keeps metrics off.
    ///
    /// ```
    /// use poridhi_config::{LogFormat, PoridhiConfig};
    ///
    /// let config = PoridhiConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.server.shutdown_timeout_secs = 5;

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Creates a production configuration preset.
    ///
    /// JSON logs at info level, metrics enabled, and a missing template
    /// directory fails startup.
    ///
    /// ```
    /// use poridhi_config::{LogFormat, PoridhiConfig};
    ///
    /// let config = PoridhiConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// assert!(config.metrics.enabled);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config.metrics.enabled = true;
        config.metrics.addr = Some("0.0.0.0:9090".to_string());

        config.templates.required = true;

        config
    }

    /// Returns the telemetry settings implied by this configuration.
    #[must_use]
    pub fn telemetry(&self) -> poridhi_telemetry::TelemetryConfig {
        poridhi_telemetry::TelemetryConfig {
            logging: (&self.logging).into(),
            metrics: (&self.metrics).into(),
        }
    }
}
