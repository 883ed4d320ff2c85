//! Layered configuration loader.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! defaults, files, and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, PoridhiConfig};

/// The default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "PORIDHI";

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use poridhi_config::ConfigLoader;
///
/// # fn main() -> Result<(), poridhi_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("poridhi.toml")?
///     .with_env_prefix("PORIDHI")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: PoridhiConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader seeded with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PoridhiConfig::default(),
            env_prefix: None,
        }
    }

    /// Resets to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = PoridhiConfig::default();
        self
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use poridhi_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PoridhiConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = PoridhiConfig::production();
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format follows the extension: `.toml` or `.json`. Sections present
    /// in the file replace the current ones; absent sections are kept.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.merge(&content, &format)?;
        tracing::debug!(path = %path.display(), "configuration file loaded");

        Ok(self)
    }

    /// Loads a file if it exists, otherwise continues unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `"toml"` or `"json"` format.
    ///
    /// ```
    /// use poridhi_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.merge(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Enables environment overrides under `prefix`.
    ///
    /// With prefix `PORIDHI`, `PORIDHI__SERVER__HTTP_ADDR=0.0.0.0:9000`
    /// overrides `server.http_addr`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment value cannot be parsed or the
    /// final configuration is invalid.
    pub fn load(mut self) -> Result<PoridhiConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: BTreeMap<String, String> = env::vars()
                .filter(|(k, _)| k.starts_with(&format!("{prefix}__")))
                .collect();
            self.apply_env_vars(&prefix, &vars)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> PoridhiConfig {
        self.config
    }

    fn merge(&mut self, content: &str, format: &str) -> Result<(), ConfigError> {
        let layer: FileLayer = match format {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        if let Some(server) = layer.server {
            self.config.server = server;
        }
        if let Some(logging) = layer.logging {
            self.config.logging = logging;
        }
        if let Some(metrics) = layer.metrics {
            self.config.metrics = metrics;
        }
        if let Some(templates) = layer.templates {
            self.config.templates = templates;
        }
        Ok(())
    }

    fn apply_env_vars(
        &mut self,
        prefix: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        for (key, value) in vars {
            self.apply_env_var(key, value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env(key, "invalid key format"))?;

        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "MAX_CONNECTIONS"] => config.server.max_connections = parse_int(key, value)?,
            ["SERVER", "MAX_BODY_BYTES"] => config.server.max_body_bytes = parse_int(key, value)?,

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_flag(key, value)?;
            }

            ["METRICS", "ENABLED"] => config.metrics.enabled = parse_flag(key, value)?,
            ["METRICS", "ADDR"] => {
                config.metrics.addr = (!value.is_empty()).then(|| value.to_string());
            }

            ["TEMPLATES", "DIRECTORY"] => config.templates.directory = value.to_string(),
            ["TEMPLATES", "REQUIRED"] => config.templates.required = parse_flag(key, value)?,

            _ => tracing::warn!(var = key, "ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

/// A file layer: every section optional so absent ones keep their value.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayer {
    server: Option<crate::ServerConfig>,
    logging: Option<crate::LoggingConfig>,
    metrics: Option<crate::MetricsConfig>,
    templates: Option<crate::TemplatesConfig>,
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env(key, "expected integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
