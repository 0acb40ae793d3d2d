//! Configuration using Figment
//!
//! Configuration is loaded from:
//! 1. `config/default.toml` (base configuration)
//! 2. Environment variables (prefixed with `COBOLT_`, sections split by `__`)
//!
//! ```text
//! COBOLT_SERIAL__PORT=/dev/ttyUSB0
//! COBOLT_SERIAL__BAUD_RATE=115200
//! COBOLT_APPLICATION__LOG_LEVEL=debug
//! ```
//!
//! Every field has a default, so an empty or missing file yields a usable
//! configuration with no port selected.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "COBOLT_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Serial link settings
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port (e.g., "/dev/ttyUSB0", "COM3"); unset until chosen
    #[serde(default)]
    pub port: Option<String>,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout for one response line in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Appended to every command
    #[serde(default = "default_line_terminator")]
    pub line_terminator: String,
    /// Ends every response line
    #[serde(default = "default_response_terminator")]
    pub response_terminator: String,
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_line_terminator() -> String {
    "\r".to_string()
}

fn default_response_terminator() -> String {
    "\r\n".to_string()
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            line_terminator: default_line_terminator(),
            response_terminator: default_response_terminator(),
        }
    }
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl LaserConfig {
    /// Load configuration from `config/default.toml` and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    ///
    /// Precedence (highest to lowest): environment, file, built-in defaults.
    /// A missing file is not an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(LaserConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::LoadError(Box::new(e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Checks:
    /// - Log level is valid (trace, debug, info, warn, error)
    /// - Baud rate and timeout are non-zero
    /// - Terminators are non-empty
    /// - A configured port is not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.serial.baud_rate == 0 {
            return Err(ConfigError::ValidationError(
                "serial.baud_rate must be greater than zero".to_string(),
            ));
        }

        if self.serial.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "serial.timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.serial.line_terminator.is_empty() || self.serial.response_terminator.is_empty() {
            return Err(ConfigError::ValidationError(
                "serial terminators cannot be empty".to_string(),
            ));
        }

        if let Some(port) = &self.serial.port {
            if port.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "serial.port cannot be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}
