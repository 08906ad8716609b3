//! Capgate Telemetry - Diagnostic logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and one of
//! several output formats. Access audit events (target `capgate::access`)
//! flow through the same subscriber, so they can be filtered independently
//! with a directive such as `capgate::access=warn`.
//!
//! # Example
//!
//! ```rust,no_run
//! use capgate_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), capgate_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("capgate_policy=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("Authorization engine ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
