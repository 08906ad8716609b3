//! The authorization error kind.
//!
//! Every authorization failure collapses into [`AuthorizationError`], which a
//! transport always surfaces as "forbidden". Failures raised by a resource's
//! own handler or modifiers are not authorization errors and never pass
//! through this type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::action::RequiredAction;
use crate::policy::Policy;

/// Machine-readable reason for an authorization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No resource is registered under the requested code.
    ResourceNotFound,
    /// A matching policy has effect deny.
    Denied,
    /// At least one required action has no covering policy.
    Unmatched,
    /// A modify policy names a modifier the resource does not declare.
    UnknownModifier,
    /// A modify policy's argument fails the modifier's schema.
    InvalidModifierArg,
}

impl DenialReason {
    /// Stable snake_case code for logs and transport payloads.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::ResourceNotFound => "resource_not_found",
            Self::Denied => "denied",
            Self::Unmatched => "unmatched",
            Self::UnknownModifier => "unknown_modifier",
            Self::InvalidModifierArg => "invalid_modifier_arg",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Authorization failure with its diagnostic payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthorizationError {
    /// The resource code is not registered.
    #[error("forbidden: resource '{code}' not found")]
    ResourceNotFound {
        /// Requested resource code.
        code: String,
    },

    /// A matching policy denied an action.
    #[error("forbidden: {action} denied by policy '{policy}'")]
    Denied {
        /// The first denying policy encountered.
        policy: Box<Policy>,
        /// The action it denied.
        action: RequiredAction,
    },

    /// Some required actions were not covered by any allow/modify policy.
    #[error("forbidden: {} required action(s) not covered by any policy", unmatched.len())]
    Unmatched {
        /// Uncovered actions, in extraction order.
        unmatched: Vec<RequiredAction>,
    },

    /// A modify policy names a modifier the resource does not declare.
    #[error("forbidden: resource '{resource}' declares no modifier '{modifier}'")]
    UnknownModifier {
        /// Resource code.
        resource: String,
        /// Requested modifier code.
        modifier: String,
    },

    /// A modify policy's argument was rejected by the modifier's schema.
    ///
    /// `detail` is kept for operators and never rendered by `Display`.
    #[error("forbidden: invalid policy configuration for modifier '{modifier}'")]
    InvalidModifierArg {
        /// Resource code.
        resource: String,
        /// Modifier code.
        modifier: String,
        /// Validator message.
        detail: String,
    },
}

impl AuthorizationError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(code: impl Into<String>) -> Self {
        Self::ResourceNotFound { code: code.into() }
    }

    /// Create a denied error.
    #[must_use]
    pub fn denied(policy: Policy, action: RequiredAction) -> Self {
        Self::Denied {
            policy: Box::new(policy),
            action,
        }
    }

    /// The machine-readable reason.
    #[must_use]
    pub fn reason(&self) -> DenialReason {
        match self {
            Self::ResourceNotFound { .. } => DenialReason::ResourceNotFound,
            Self::Denied { .. } => DenialReason::Denied,
            Self::Unmatched { .. } => DenialReason::Unmatched,
            Self::UnknownModifier { .. } => DenialReason::UnknownModifier,
            Self::InvalidModifierArg { .. } => DenialReason::InvalidModifierArg,
        }
    }

    /// Whether a transport should answer "forbidden". Always true.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        true
    }
}

/// Result type for authorization operations.
pub type AuthorizationResult<T> = Result<T, AuthorizationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let err = AuthorizationError::not_found("users");
        assert_eq!(err.reason(), DenialReason::ResourceNotFound);
        assert_eq!(err.reason().code(), "resource_not_found");
        assert!(err.is_forbidden());

        let err = AuthorizationError::denied(
            Policy::deny("users", "read"),
            RequiredAction::new("users", "read"),
        );
        assert_eq!(err.reason().to_string(), "denied");
    }

    #[test]
    fn test_invalid_arg_display_hides_detail() {
        let err = AuthorizationError::InvalidModifierArg {
            resource: "users".to_string(),
            modifier: "limit".to_string(),
            detail: "\"abc\" is not of type \"integer\"".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("forbidden"));
        assert!(!rendered.contains("integer"));
    }

    #[test]
    fn test_unmatched_display_counts_actions() {
        let err = AuthorizationError::Unmatched {
            unmatched: vec![
                RequiredAction::new("a", "read"),
                RequiredAction::new("b", "read"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "forbidden: 2 required action(s) not covered by any policy"
        );
    }
}
