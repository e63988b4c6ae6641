//! Configuration module for the fleet console
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`FLEET_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use fleet::config::FleetConfig;
//!
//! let config = FleetConfig::default();
//! assert_eq!(config.polling.interval_seconds, 30);
//!
//! let toml = r#"
//! [api]
//! base_url = "http://10.0.0.2:8000"
//! "#;
//! let config: FleetConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.api.base_url, "http://10.0.0.2:8000");
//! ```

pub mod api;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod polling;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig, COMPONENTS};
pub use metrics::MetricsConfig;
pub use polling::PollingConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the fleet console.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FleetConfig {
    /// Fleet API endpoint
    pub api: ApiConfig,
    /// Registry polling
    pub polling: PollingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Prometheus export
    pub metrics: MetricsConfig,
}

impl FleetConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports FLEET_* environment variables for common settings.
    /// Invalid values are ignored (previous values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("FLEET_API_URL") {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(interval) = std::env::var("FLEET_POLL_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.polling.interval_seconds = secs;
            }
        }
        if let Ok(level) = std::env::var("FLEET_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FLEET_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(listen) = std::env::var("FLEET_METRICS_LISTEN") {
            if let Ok(addr) = listen.parse() {
                self.metrics.listen = Some(addr);
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "api.timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        if self.polling.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "polling.interval_seconds".to_string(),
                message: "interval must be non-zero".to_string(),
            });
        }
        self.logging.validate()?;

        Ok(())
    }
}
