//! Principals - an authenticated identity plus its ordered policy set.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::policy::Policy;
use crate::types::PrincipalId;

/// An authenticated identity and the policies that apply to it.
///
/// Created by the authentication layer per request. The policy list is held
/// behind an `Arc`, so cloning a principal (or snapshotting it for a bound
/// invocation) never copies policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    policies: Arc<[Policy]>,
}

impl Principal {
    /// Create a principal.
    #[must_use]
    pub fn new(id: impl Into<PrincipalId>, policies: impl Into<Arc<[Policy]>>) -> Self {
        Self {
            id: id.into(),
            policies: policies.into(),
        }
    }

    /// Create a principal with no policies. Every invocation it makes fails.
    #[must_use]
    pub fn anonymous(id: impl Into<PrincipalId>) -> Self {
        Self::new(id, Vec::<Policy>::new())
    }

    /// The principal's identity.
    #[must_use]
    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    /// The principal's policies, in evaluation order.
    #[must_use]
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Shared handle to the policy list.
    #[must_use]
    pub fn policy_set(&self) -> Arc<[Policy]> {
        Arc::clone(&self.policies)
    }

    /// Return a copy of this principal with another policy appended.
    ///
    /// The original is left untouched; principals are immutable once handed
    /// to an invocation.
    #[must_use]
    pub fn with_policy(&self, policy: Policy) -> Self {
        let mut policies = self.policies.to_vec();
        policies.push(policy);
        Self::new(self.id.clone(), policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_policies() {
        let principal = Principal::new("alice", vec![Policy::allow("users", "read")]);
        let snapshot = principal.clone();
        assert!(Arc::ptr_eq(&principal.policy_set(), &snapshot.policy_set()));
    }

    #[test]
    fn test_with_policy_appends_without_mutating() {
        let principal = Principal::new("alice", vec![Policy::allow("users", "read")]);
        let extended = principal.with_policy(Policy::deny("users", "write"));

        assert_eq!(principal.policies().len(), 1);
        assert_eq!(extended.policies().len(), 2);
        assert!(extended.policies()[1].is_deny());
        assert_eq!(extended.id(), principal.id());
    }

    #[test]
    fn test_anonymous_has_no_policies() {
        assert!(Principal::anonymous("guest").policies().is_empty());
    }
}
