//! Configuration schema types.
//!
//! This module defines the structure of every configuration section. All
//! sections reject unknown fields, so a typo in a file fails loudly.

use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use poridhi_config::ServerConfig;
///
/// let config = ServerConfig {
///     http_addr: "127.0.0.1:8000".to_string(),
///     ..ServerConfig::default()
/// };
/// assert_eq!(config.shutdown_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum number of concurrent connections; 0 means unlimited.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Largest request body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_connections: default_max_connections(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    10000
}

fn default_max_body_bytes() -> u64 {
    2 * 1024 * 1024
}

const fn default_true() -> bool {
    true
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives (e.g. `info` or `poridhi_server=debug,warn`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl From<&LoggingConfig> for poridhi_telemetry::LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            filter: config.level.clone(),
            output: match config.format {
                LogFormat::Json => poridhi_telemetry::LogOutput::Json,
                LogFormat::Pretty => poridhi_telemetry::LogOutput::Pretty,
            },
            source_location: config.include_location,
        }
    }
}

/// Metrics configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable metrics collection.
    #[serde(default)]
    pub enabled: bool,

    /// Prometheus scrape listener address. Unset keeps metrics in-process.
    #[serde(default)]
    pub addr: Option<String>,
}

impl From<&MetricsConfig> for poridhi_telemetry::MetricsConfig {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            enabled: config.enabled,
            addr: config.addr.clone(),
            ..Self::default()
        }
    }
}

/// Template configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory loaded at startup. Templates are named by their path
    /// relative to it.
    #[serde(default = "default_templates_dir")]
    pub directory: String,

    /// Whether a missing directory is a startup error.
    #[serde(default)]
    pub required: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: default_templates_dir(),
            required: false,
        }
    }
}

fn default_templates_dir() -> String {
    "templates".to_string()
}
