//! Policy evaluation.
//!
//! Resolves a principal's ordered policy list against the flattened required
//! actions of one invocation.

use std::collections::BTreeMap;
use std::sync::Arc;

use capgate_core::{AuthorizationError, AuthorizationResult, Effect, Policy, RequiredAction};

use crate::matcher::PathMatcher;

/// Policies that matched one required action.
#[derive(Debug, Clone)]
pub struct ActionCoverage<'p, 'r> {
    /// The required action.
    pub action: &'r RequiredAction,
    /// Matching allow/modify policies, in principal order.
    pub policies: Vec<&'p Policy>,
}

impl ActionCoverage<'_, '_> {
    /// Whether a modify policy applies to this action.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.policies.iter().any(|p| p.effect() == Effect::Modify)
    }
}

/// Successful evaluation result.
#[derive(Debug, Clone)]
pub struct Evaluation<'p, 'r> {
    matched: Vec<&'p Policy>,
    coverage: Vec<ActionCoverage<'p, 'r>>,
}

impl<'p, 'r> Evaluation<'p, 'r> {
    /// Every policy that matched any required action.
    ///
    /// Each policy appears once, in the principal's order, even when it
    /// matched several actions.
    #[must_use]
    pub fn matched(&self) -> &[&'p Policy] {
        &self.matched
    }

    /// Per-action coverage, in required-action order.
    #[must_use]
    pub fn coverage(&self) -> &[ActionCoverage<'p, 'r>] {
        &self.coverage
    }

    /// Matched modify policies, in principal order.
    pub fn modify_policies(&self) -> impl DoubleEndedIterator<Item = &'p Policy> + '_ {
        self.matched
            .iter()
            .copied()
            .filter(|p| p.effect() == Effect::Modify)
    }
}

/// Evaluates policy sets against required actions.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    matcher: Arc<PathMatcher>,
}

impl PolicyEvaluator {
    /// Create an evaluator backed by a shared matcher.
    #[must_use]
    pub fn new(matcher: Arc<PathMatcher>) -> Self {
        Self { matcher }
    }

    /// The shared matcher.
    #[must_use]
    pub fn matcher(&self) -> &Arc<PathMatcher> {
        &self.matcher
    }

    /// Check whether a policy applies to a required action.
    #[must_use]
    pub fn policy_matches(&self, policy: &Policy, required: &RequiredAction) -> bool {
        self.matcher
            .matches_path(&required.path, policy.resource_pattern())
            && self
                .matcher
                .matches_action(&required.action, policy.action_pattern())
    }

    /// Evaluate `policies` against `required`.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationError::Denied`] for the first matching deny policy,
    ///   scanning actions in order and policies in order within each action
    /// - [`AuthorizationError::Unmatched`] when some actions have no matching
    ///   allow or modify policy
    pub fn evaluate<'p, 'r>(
        &self,
        policies: &'p [Policy],
        required: &'r [RequiredAction],
    ) -> AuthorizationResult<Evaluation<'p, 'r>> {
        let mut matched: BTreeMap<usize, &'p Policy> = BTreeMap::new();
        let mut coverage = Vec::with_capacity(required.len());
        let mut unmatched = Vec::new();

        for action in required {
            let mut covering = Vec::new();

            for (index, policy) in policies.iter().enumerate() {
                if !self.policy_matches(policy, action) {
                    continue;
                }
                if policy.is_deny() {
                    tracing::debug!(
                        action = %action,
                        policy = %policy,
                        "Action denied by policy"
                    );
                    return Err(AuthorizationError::denied(policy.clone(), action.clone()));
                }
                matched.insert(index, policy);
                covering.push(policy);
            }

            if covering.is_empty() {
                unmatched.push(action.clone());
            }
            coverage.push(ActionCoverage {
                action,
                policies: covering,
            });
        }

        if !unmatched.is_empty() {
            tracing::debug!(
                unmatched = unmatched.len(),
                required = required.len(),
                "Required actions not covered by any policy"
            );
            return Err(AuthorizationError::Unmatched { unmatched });
        }

        tracing::trace!(
            matched = matched.len(),
            required = required.len(),
            "Policy evaluation succeeded"
        );

        Ok(Evaluation {
            matched: matched.into_values().collect(),
            coverage,
        })
    }
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(PathMatcher::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capgate_core::DenialReason;

    fn required(pairs: &[(&str, &str)]) -> Vec<RequiredAction> {
        pairs
            .iter()
            .map(|(path, action)| RequiredAction::new(*path, *action))
            .collect()
    }

    #[test]
    fn test_single_allow_covers_action() {
        let evaluator = PolicyEvaluator::default();
        let policies = vec![Policy::allow("users/*", "rea*")];
        let required = required(&[("users/123", "read")]);

        let evaluation = evaluator.evaluate(&policies, &required).unwrap();
        assert_eq!(evaluation.matched(), &[&policies[0]]);
        assert!(!evaluation.coverage()[0].is_filtered());
    }

    #[test]
    fn test_deny_wins_regardless_of_position() {
        let evaluator = PolicyEvaluator::default();
        let required = required(&[("users/1", "read")]);

        for policies in [
            vec![Policy::deny("users/*", "read"), Policy::allow("users/*", "read")],
            vec![Policy::allow("users/*", "read"), Policy::deny("users/*", "read")],
        ] {
            let err = evaluator.evaluate(&policies, &required).unwrap_err();
            assert_eq!(err.reason(), DenialReason::Denied);
        }
    }

    #[test]
    fn test_first_deny_is_reported() {
        let evaluator = PolicyEvaluator::default();
        let policies = vec![
            Policy::allow("**", "*"),
            Policy::deny("b", "*"),
            Policy::deny("a", "*"),
        ];
        let required = required(&[("a", "read"), ("b", "read")]);

        let err = evaluator.evaluate(&policies, &required).unwrap_err();
        match err {
            AuthorizationError::Denied { policy, action } => {
                assert_eq!(*policy, Policy::deny("a", "*"));
                assert_eq!(action, RequiredAction::new("a", "read"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_action_needs_coverage() {
        let evaluator = PolicyEvaluator::default();
        let policies = vec![Policy::allow("a", "read")];
        let required = required(&[("a", "read"), ("b", "read"), ("a", "write")]);

        let err = evaluator.evaluate(&policies, &required).unwrap_err();
        match err {
            AuthorizationError::Unmatched { unmatched } => {
                assert_eq!(
                    unmatched,
                    vec![RequiredAction::new("b", "read"), RequiredAction::new("a", "write")]
                );
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deny_beats_unmatched() {
        let evaluator = PolicyEvaluator::default();
        let policies = vec![Policy::deny("b", "read")];
        let required = required(&[("a", "read"), ("b", "read")]);

        let err = evaluator.evaluate(&policies, &required).unwrap_err();
        assert_eq!(err.reason(), DenialReason::Denied);
    }

    #[test]
    fn test_all_matching_policies_kept_once() {
        let evaluator = PolicyEvaluator::default();
        let policies = vec![
            Policy::allow("objects/**", "*"),
            Policy::modify("objects/*", "read", "redact"),
            Policy::allow("unrelated", "*"),
        ];
        let required = required(&[("objects/1", "read"), ("objects/2", "read")]);

        let evaluation = evaluator.evaluate(&policies, &required).unwrap();
        assert_eq!(evaluation.matched(), &[&policies[0], &policies[1]]);
        assert_eq!(evaluation.coverage().len(), 2);
        assert!(evaluation.coverage().iter().all(ActionCoverage::is_filtered));
        assert_eq!(evaluation.modify_policies().count(), 1);
    }

    #[test]
    fn test_empty_required_actions_succeed() {
        let evaluator = PolicyEvaluator::default();
        let evaluation = evaluator.evaluate(&[], &[]).unwrap();
        assert!(evaluation.matched().is_empty());
    }

    #[test]
    fn test_no_policies_leaves_everything_unmatched() {
        let evaluator = PolicyEvaluator::default();
        let required = required(&[("a", "read")]);
        let err = evaluator.evaluate(&[], &required).unwrap_err();
        assert_eq!(err.reason(), DenialReason::Unmatched);
    }
}
