//! Combined telemetry settings.

use crate::logging::{LogConfig, LogOutput};
use crate::metrics::MetricsConfig;

/// Logging plus metrics, as passed to [`init_telemetry`](crate::init_telemetry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Starts from the production defaults.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct TelemetryConfigBuilder {
    config: TelemetryConfig,
}

impl TelemetryConfigBuilder {
    /// Replaces the logging section.
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Sets the log filter directives, keeping the other logging settings.
    pub fn log_filter(mut self, directives: impl Into<String>) -> Self {
        self.config.logging.filter = directives.into();
        self
    }

    /// Sets the log rendering.
    pub fn log_output(mut self, output: LogOutput) -> Self {
        self.config.logging.output = output;
        self
    }

    /// Replaces the metrics section.
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.config.metrics = metrics;
        self
    }

    /// Enables metrics with a Prometheus listener on `addr`.
    pub fn metrics_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.metrics.enabled = true;
        self.config.metrics.addr = Some(addr.into());
        self
    }

    /// Turns metrics off.
    pub fn without_metrics(mut self) -> Self {
        self.config.metrics.enabled = false;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::builder().build();
        assert_eq!(config, TelemetryConfig::default());
        assert_eq!(config.logging, LogConfig::production());
        assert!(config.metrics.addr.is_none());
    }

    #[test]
    fn test_log_filter_keeps_other_fields() {
        let config = TelemetryConfig::builder()
            .logging(LogConfig::development())
            .log_filter("trace")
            .build();

        assert_eq!(config.logging.filter, "trace");
        assert_eq!(config.logging.output, LogOutput::Pretty);
        assert!(config.logging.source_location);
    }

    #[test]
    fn test_metrics_toggles() {
        let config = TelemetryConfig::builder()
            .metrics_addr("0.0.0.0:9999")
            .build();
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.addr.as_deref(), Some("0.0.0.0:9999"));

        let config = TelemetryConfig::builder().without_metrics().build();
        assert!(!config.metrics.enabled);
    }
}
