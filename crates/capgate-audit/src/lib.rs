//! Capgate Audit - Access decision audit trail.
//!
//! This crate provides:
//! - [`AccessRecord`], one entry per authorization outcome
//! - The [`AccessLogger`] sink trait
//! - Sinks: [`TracingAccessLogger`], [`MemoryAccessLog`],
//!   [`FanoutAccessLogger`], [`NullAccessLogger`]
//!
//! The audit trail is a side channel. Sinks observe decisions that have
//! already been made; nothing here is ever consulted to make one.
//!
//! # Example
//!
//! ```
//! use capgate_audit::{AccessDecision, AccessLogger, AccessRecord, MemoryAccessLog};
//! use capgate_core::{InvocationId, PrincipalId, Policy};
//!
//! let log = MemoryAccessLog::new(16);
//! log.log(
//!     AccessRecord::new(
//!         InvocationId::new(),
//!         PrincipalId::new("alice"),
//!         "users",
//!         "users/123",
//!         "read",
//!         AccessDecision::Allowed,
//!     )
//!     .with_policies(vec![Policy::allow("users/*", "read")]),
//! );
//!
//! assert_eq!(log.count(AccessDecision::Allowed), 1);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod logger;
mod memory;
mod record;

pub use logger::{
    ACCESS_TARGET, AccessLogger, FanoutAccessLogger, NullAccessLogger, TracingAccessLogger,
};
pub use memory::MemoryAccessLog;
pub use record::{AccessDecision, AccessRecord, RESOURCE_LEVEL_ACTION};
