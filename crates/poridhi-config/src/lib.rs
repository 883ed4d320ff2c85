//! Typed configuration for Poridhi applications.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (unknown fields are errors)
//! - Layered loading (defaults → file → env)
//!
//! The root type is [`PoridhiConfig`], with one section per concern:
//!
//! - [`ServerConfig`] - bind address, shutdown timeout, limits
//! - [`LoggingConfig`] - log filter and format
//! - [`MetricsConfig`] - dispatch metrics and the Prometheus listener
//! - [`TemplatesConfig`] - the template directory
//!
//! # Example
//!
//! ```no_run
//! use poridhi_config::ConfigLoader;
//!
//! # fn main() -> Result<(), poridhi_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("poridhi.toml")?
//!     .with_env_prefix("PORIDHI")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//!
//! [logging]
//! level = "info,poridhi_server=debug"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [templates]
//! directory = "templates"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values are overridden with `PREFIX__SECTION__KEY`:
//!
//! - `PORIDHI__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `PORIDHI__LOGGING__LEVEL=debug`
//! - `PORIDHI__TEMPLATES__DIRECTORY=/srv/templates`

#![doc(html_root_url = "https://docs.rs/poridhi-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PoridhiConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LoggingConfig, MetricsConfig, ServerConfig, TemplatesConfig};
