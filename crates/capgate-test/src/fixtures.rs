//! Test fixtures for principals, policies, and resources.

use serde_json::Value;
use std::sync::Arc;

use capgate_core::{ActionGroup, Policy, Principal};
use capgate_runtime::{Resource, ResourceBuilder};

/// Principal ID used by [`test_principal`].
pub const TEST_PRINCIPAL_ID: &str = "test-user";

/// Create a test principal holding `policies`.
#[must_use]
pub fn test_principal(policies: Vec<Policy>) -> Principal {
    Principal::new(TEST_PRINCIPAL_ID, policies)
}

/// Allow policy.
#[must_use]
pub fn allow(resource: &str, action: &str) -> Policy {
    Policy::allow(resource, action)
}

/// Deny policy.
#[must_use]
pub fn deny(resource: &str, action: &str) -> Policy {
    Policy::deny(resource, action)
}

/// Modify policy without an argument.
#[must_use]
pub fn modify(resource: &str, action: &str, modifier: &str) -> Policy {
    Policy::modify(resource, action, modifier)
}

/// Extract actions from an echo input.
///
/// `path` (string or array of segments) defaults to the resource code,
/// `actions` defaults to `["read"]`.
fn echo_actions(code: &str, input: &Value) -> Vec<ActionGroup> {
    let actions: Vec<String> = input["actions"].as_array().map_or_else(
        || vec!["read".to_string()],
        |actions| {
            actions
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        },
    );

    match &input["path"] {
        Value::String(path) => vec![ActionGroup::new(path.as_str(), actions)],
        Value::Array(segments) => {
            let segments: Vec<String> = segments
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            vec![ActionGroup::new(segments, actions)]
        },
        _ => vec![ActionGroup::new(code, actions)],
    }
}

/// Builder for a resource whose extractor reads `path`/`actions` from the
/// input. Finish it with your own handler.
#[must_use]
pub fn echo_resource_builder(code: &str) -> ResourceBuilder {
    let owned = code.to_string();
    Resource::builder(code, move |input: &Value| echo_actions(&owned, input))
}

/// A resource that returns its input unchanged.
#[must_use]
pub fn echo_resource(code: &str) -> Resource {
    echo_resource_builder(code)
        .handler(|input: Value, _principal: Arc<Principal>| async move { Ok(input) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_fixtures() {
        assert!(deny("a", "b").is_deny());
        assert_eq!(allow("users/*", "read").resource_pattern(), "users/*");
        assert_eq!(
            modify("users", "read", "redact").modifier(),
            Some(("redact", None))
        );
    }

    #[test]
    fn test_principal_fixture() {
        let principal = test_principal(vec![allow("x", "y")]);
        assert_eq!(principal.id().as_str(), TEST_PRINCIPAL_ID);
        assert_eq!(principal.policies().len(), 1);
    }

    #[test]
    fn test_echo_actions() {
        let resource = echo_resource("echo");

        let defaults = resource.required_actions(&json!({}));
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].to_string(), "echo#read");

        let explicit =
            resource.required_actions(&json!({"path": ["a", "b"], "actions": ["x", "y"]}));
        let rendered: Vec<String> = explicit.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a/b#x", "a/b#y"]);
    }
}
