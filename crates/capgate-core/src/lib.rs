//! Capgate Core - Foundation types for capability-based authorization.
//!
//! This crate provides:
//! - Principal identity and its ordered policy set
//! - The `Allow | Deny | Modify` policy variant type
//! - Resource paths and the required (path, action) pairs an invocation needs
//! - The single [`AuthorizationError`] kind every authorization failure collapses to
//!
//! # Example
//!
//! ```
//! use capgate_core::{ActionGroup, Policy, Principal, RequiredAction};
//!
//! let principal = Principal::new(
//!     "svc-reporting",
//!     vec![
//!         Policy::allow("users/*", "read"),
//!         Policy::modify("users/*", "read", "redact"),
//!     ],
//! );
//! assert_eq!(principal.policies().len(), 2);
//!
//! let required: Vec<RequiredAction> = ActionGroup::new("users/123", ["read"]).flatten().collect();
//! assert_eq!(required[0].path.joined(), "users/123");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod action;
pub mod error;
pub mod path;
pub mod policy;
pub mod principal;
pub mod types;

pub use action::{ActionGroup, RequiredAction};
pub use error::{AuthorizationError, AuthorizationResult, DenialReason};
pub use path::ResourcePath;
pub use policy::{Effect, Policy};
pub use principal::Principal;
pub use types::{InvocationId, PrincipalId};
