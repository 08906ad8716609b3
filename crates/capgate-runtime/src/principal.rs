//! Principal-side entry point.
//!
//! Lets callers write `principal.acquire(&registry, "users")` instead of
//! going through the registry. Both paths behave identically.

use serde::Serialize;
use serde::de::DeserializeOwned;

use capgate_core::{AuthorizationResult, Principal};

use crate::invocation::{BoundInvocation, TypedInvocation};
use crate::registry::ResourceRegistry;

/// Acquire a bound invocation on behalf of a principal.
pub trait Acquire {
    /// Bind to the resource registered under `code`.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no such resource is registered.
    fn acquire(&self, registry: &ResourceRegistry, code: &str)
    -> AuthorizationResult<BoundInvocation>;

    /// Bind to a resource with `serde`-typed input and output.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no such resource is registered.
    fn acquire_typed<I, O>(
        &self,
        registry: &ResourceRegistry,
        code: &str,
    ) -> AuthorizationResult<TypedInvocation<I, O>>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.acquire(registry, code).map(BoundInvocation::typed::<I, O>)
    }
}

impl Acquire for Principal {
    fn acquire(
        &self,
        registry: &ResourceRegistry,
        code: &str,
    ) -> AuthorizationResult<BoundInvocation> {
        registry.invoke(code, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use capgate_core::{ActionGroup, Policy};
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[derive(Serialize)]
    struct Lookup {
        id: u64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
        name: String,
    }

    fn registry() -> ResourceRegistry {
        let registry = ResourceRegistry::new();
        registry.register(
            Resource::builder("users", |input: &Value| {
                vec![ActionGroup::new(
                    format!("users/{}", input["id"]),
                    ["read"],
                )]
            })
            .handler(|input: Value, _principal: Arc<Principal>| async move {
                Ok(json!({"id": input["id"], "name": "ada"}))
            }),
        );
        registry
    }

    #[tokio::test]
    async fn test_acquire_matches_registry_invoke() {
        let registry = registry();
        let principal = Principal::new("alice", vec![Policy::allow("users/*", "read")]);

        let via_principal = principal
            .acquire(&registry, "users")
            .unwrap()
            .call(json!({"id": 1}))
            .await
            .unwrap();
        let via_registry = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 1}))
            .await
            .unwrap();
        assert_eq!(via_principal, via_registry);
    }

    #[tokio::test]
    async fn test_acquire_typed() {
        let registry = registry();
        let principal = Principal::new("alice", vec![Policy::allow("users/*", "read")]);

        let lookup = principal
            .acquire_typed::<Lookup, User>(&registry, "users")
            .unwrap();
        let user = lookup.call(&Lookup { id: 9 }).await.unwrap();
        assert_eq!(
            user,
            User {
                id: 9,
                name: "ada".to_string()
            }
        );
    }

    #[test]
    fn test_acquire_unknown_resource() {
        let registry = registry();
        assert!(
            Principal::anonymous("bob")
                .acquire(&registry, "orders")
                .is_err()
        );
    }
}
