//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthorizationError, AuthorizationResult, DenialReason};

// Identity and policies
pub use crate::{Effect, Policy, Principal, PrincipalId};

// Paths and actions
pub use crate::{ActionGroup, RequiredAction, ResourcePath};

// Correlation
pub use crate::InvocationId;
