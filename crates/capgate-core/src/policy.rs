//! Policies - declarative rules granting, denying, or transforming access.
//!
//! A policy matches a (path, action) pair through two glob patterns. Its
//! effect decides what a match means:
//!
//! - `Allow` covers the action
//! - `Deny` fails the whole invocation the moment it matches
//! - `Modify` covers the action and wraps the resource handler with the
//!   resource's modifier named by `modifier`
//!
//! Policies have no identity beyond their position in a principal's list.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The effect of a matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Grants the action.
    Allow,
    /// Forbids the action.
    Deny,
    /// Grants the action through a modifier.
    Modify,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::Modify => write!(f, "modify"),
        }
    }
}

/// A single policy in a principal's policy set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Policy {
    /// Grant matching actions.
    Allow {
        /// Glob over resource paths.
        resource: String,
        /// Glob over action names.
        action: String,
    },
    /// Forbid matching actions.
    Deny {
        /// Glob over resource paths.
        resource: String,
        /// Glob over action names.
        action: String,
    },
    /// Grant matching actions and apply a resource modifier.
    Modify {
        /// Glob over resource paths.
        resource: String,
        /// Glob over action names.
        action: String,
        /// Code of the modifier declared by the target resource.
        modifier: String,
        /// Argument passed to the modifier, validated against its schema.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg: Option<Value>,
    },
}

impl Policy {
    /// Create an allow policy.
    #[must_use]
    pub fn allow(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Allow {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Create a deny policy.
    #[must_use]
    pub fn deny(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Deny {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Create a modify policy without an argument.
    #[must_use]
    pub fn modify(
        resource: impl Into<String>,
        action: impl Into<String>,
        modifier: impl Into<String>,
    ) -> Self {
        Self::Modify {
            resource: resource.into(),
            action: action.into(),
            modifier: modifier.into(),
            arg: None,
        }
    }

    /// Set the modifier argument. Has no effect on allow/deny policies.
    #[must_use]
    pub fn with_arg(mut self, value: Value) -> Self {
        if let Self::Modify { arg, .. } = &mut self {
            *arg = Some(value);
        }
        self
    }

    /// The resource path pattern.
    #[must_use]
    pub fn resource_pattern(&self) -> &str {
        match self {
            Self::Allow { resource, .. }
            | Self::Deny { resource, .. }
            | Self::Modify { resource, .. } => resource,
        }
    }

    /// The action name pattern.
    #[must_use]
    pub fn action_pattern(&self) -> &str {
        match self {
            Self::Allow { action, .. } | Self::Deny { action, .. } | Self::Modify { action, .. } => {
                action
            },
        }
    }

    /// The policy effect.
    #[must_use]
    pub fn effect(&self) -> Effect {
        match self {
            Self::Allow { .. } => Effect::Allow,
            Self::Deny { .. } => Effect::Deny,
            Self::Modify { .. } => Effect::Modify,
        }
    }

    /// Modifier code and argument, for modify policies.
    #[must_use]
    pub fn modifier(&self) -> Option<(&str, Option<&Value>)> {
        match self {
            Self::Modify { modifier, arg, .. } => Some((modifier, arg.as_ref())),
            Self::Allow { .. } | Self::Deny { .. } => None,
        }
    }

    /// Whether this policy denies.
    #[must_use]
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modify {
                resource,
                action,
                modifier,
                ..
            } => write!(f, "modify({modifier}) {resource}#{action}"),
            _ => write!(
                f,
                "{} {}#{}",
                self.effect(),
                self.resource_pattern(),
                self.action_pattern()
            ),
        }
    }
}
