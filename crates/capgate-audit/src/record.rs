//! Access records and decisions.

use capgate_core::{DenialReason, InvocationId, Policy, PrincipalId, ResourcePath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Action recorded for outcomes that concern the resource as a whole rather
/// than one required action (missing resource, bad modifier configuration,
/// invocations with no required actions).
pub const RESOURCE_LEVEL_ACTION: &str = "invoke";

/// Outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access granted as-is.
    Allowed,
    /// Access refused.
    Denied,
    /// Access granted through at least one modifier.
    Filtered,
}

impl AccessDecision {
    /// Whether the invocation was let through.
    #[must_use]
    pub fn is_granted(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "allowed"),
            Self::Denied => write!(f, "denied"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// A single audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Invocation this record belongs to. Several records can share one.
    pub invocation: InvocationId,
    /// Principal that attempted the access.
    pub principal: PrincipalId,
    /// Code of the resource being invoked.
    pub resource: String,
    /// Path the decision concerns.
    pub path: ResourcePath,
    /// Action the decision concerns.
    pub action: String,
    /// Policies that contributed to the decision.
    pub policies: Vec<Policy>,
    /// The decision.
    pub decision: AccessDecision,
    /// Why access was refused, for denied records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl AccessRecord {
    /// Create a record with no contributing policies.
    #[must_use]
    pub fn new(
        invocation: InvocationId,
        principal: PrincipalId,
        resource: impl Into<String>,
        path: impl Into<ResourcePath>,
        action: impl Into<String>,
        decision: AccessDecision,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            invocation,
            principal,
            resource: resource.into(),
            path: path.into(),
            action: action.into(),
            policies: Vec::new(),
            decision,
            reason: None,
        }
    }

    /// Create a resource-level record, keyed by the resource code.
    #[must_use]
    pub fn resource_level(
        invocation: InvocationId,
        principal: PrincipalId,
        resource: &str,
        decision: AccessDecision,
    ) -> Self {
        Self::new(
            invocation,
            principal,
            resource,
            resource,
            RESOURCE_LEVEL_ACTION,
            decision,
        )
    }

    /// Attach contributing policies.
    #[must_use]
    pub fn with_policies(mut self, policies: Vec<Policy>) -> Self {
        self.policies = policies;
        self
    }

    /// Attach a denial reason.
    #[must_use]
    pub fn with_reason(mut self, reason: DenialReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Whether this record concerns the resource as a whole.
    #[must_use]
    pub fn is_resource_level(&self) -> bool {
        self.action == RESOURCE_LEVEL_ACTION && self.path.joined() == self.resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_level_record() {
        let record = AccessRecord::resource_level(
            InvocationId::new(),
            PrincipalId::new("alice"),
            "reports",
            AccessDecision::Denied,
        )
        .with_reason(DenialReason::ResourceNotFound);

        assert!(record.is_resource_level());
        assert_eq!(record.path.joined(), "reports");
        assert_eq!(record.reason, Some(DenialReason::ResourceNotFound));
        assert!(!record.decision.is_granted());
    }

    #[test]
    fn test_serializes_decision_snake_case() {
        let record = AccessRecord::new(
            InvocationId::new(),
            PrincipalId::new("alice"),
            "users",
            ["users", "1"],
            "read",
            AccessDecision::Filtered,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["decision"], "filtered");
        assert_eq!(json["path"], serde_json::json!(["users", "1"]));
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_filtered_is_granted() {
        assert!(AccessDecision::Filtered.is_granted());
        assert!(AccessDecision::Allowed.is_granted());
        assert_eq!(AccessDecision::Denied.to_string(), "denied");
    }
}
