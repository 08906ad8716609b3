//! Capgate Config - TOML configuration.
//!
//! A single [`Config`] covers logging, the access audit sinks, glob matcher
//! tuning, and an optional static set of principals with their policies.
//!
//! # Usage
//!
//! ```rust
//! use capgate_config::Config;
//!
//! let config = Config::from_toml_str(r#"
//! [audit]
//! sink = "memory"
//!
//! [[principals]]
//! id = "svc-reporting"
//! policies = [{ effect = "allow", resource = "users/*", action = "read" }]
//! "#).unwrap();
//!
//! let principal = config.principal("svc-reporting").unwrap();
//! assert_eq!(principal.policies().len(), 1);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`CAPGATE_LOG_LEVEL`, `CAPGATE_LOG_FORMAT`,
//!    `CAPGATE_AUDIT_ENABLED`, `CAPGATE_AUDIT_SINK`)
//! 2. **Config file** passed to [`Config::load`]
//! 3. **Built-in defaults**

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

use std::path::Path;

impl Config {
    /// Parse and validate a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if parsing or validation fails.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::from_toml_str(content)
    }

    /// Load a single config file, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or validated.
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Load from `path` (defaults when `None`), then apply `CAPGATE_*`
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Validate this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }
}
