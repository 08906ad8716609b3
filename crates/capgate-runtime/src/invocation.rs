//! Bound invocations.
//!
//! [`BoundInvocation`] pairs a registered resource with a snapshot of the
//! principal taken at bind time. Each call runs one full authorization pass
//! over that snapshot: input contract, action extraction, policy evaluation,
//! chain composition. Only then does the composed chain execute.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use capgate_audit::{AccessDecision, AccessLogger, AccessRecord};
use capgate_core::{AuthorizationError, DenialReason, InvocationId, Policy, Principal};
use capgate_policy::{Evaluation, PolicyEvaluator};

use crate::chain::MiddlewareChain;
use crate::error::{InvokeError, InvokeResult};
use crate::resource::Resource;

/// Hand a record to the audit sink. A panicking sink is contained so the
/// audit trail can never change an outcome.
pub(crate) fn emit(logger: &dyn AccessLogger, record: AccessRecord) {
    if catch_unwind(AssertUnwindSafe(|| logger.log(record))).is_err() {
        tracing::error!("Access logger panicked; record dropped");
    }
}

/// A resource bound to a principal, ready to be called.
#[derive(Clone)]
pub struct BoundInvocation {
    resource: Arc<Resource>,
    principal: Arc<Principal>,
    evaluator: PolicyEvaluator,
    access_log: Arc<dyn AccessLogger>,
}

impl BoundInvocation {
    pub(crate) fn new(
        resource: Arc<Resource>,
        principal: Arc<Principal>,
        evaluator: PolicyEvaluator,
        access_log: Arc<dyn AccessLogger>,
    ) -> Self {
        Self {
            resource,
            principal,
            evaluator,
            access_log,
        }
    }

    /// The bound resource.
    #[must_use]
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    /// The principal snapshot this invocation runs as.
    #[must_use]
    pub fn principal(&self) -> &Arc<Principal> {
        &self.principal
    }

    /// Authorize and run the resource on `input`.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::InvalidInput`] if the input fails the resource's input schema
    /// - [`InvokeError::Unauthorized`] if authorization fails
    /// - [`InvokeError::Handler`] if a modifier or the base handler fails
    /// - [`InvokeError::InvalidOutput`] if the output fails the output schema
    pub async fn call(&self, input: Value) -> InvokeResult<Value> {
        let invocation = InvocationId::new();
        let input = self.check_input(input)?;
        let chain = self.authorize(invocation, &input)?;

        tracing::debug!(
            invocation = %invocation,
            resource = %self.resource.code(),
            modifiers = chain.depth(),
            "Executing middleware chain"
        );

        let output = chain.execute(input).await.map_err(InvokeError::Handler)?;
        self.check_output(output)
    }

    /// Wrap this invocation with typed input and output.
    #[must_use]
    pub fn typed<I, O>(self) -> TypedInvocation<I, O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        TypedInvocation {
            inner: self,
            _marker: PhantomData,
        }
    }

    fn check_input(&self, input: Value) -> InvokeResult<Value> {
        match self.resource.input_schema() {
            Some(schema) => schema
                .validate(&input)
                .map_err(|violation| InvokeError::InvalidInput {
                    resource: self.resource.code().to_string(),
                    detail: violation.to_string(),
                }),
            None => Ok(input),
        }
    }

    fn check_output(&self, output: Value) -> InvokeResult<Value> {
        match self.resource.output_schema() {
            Some(schema) => schema
                .validate(&output)
                .map_err(|violation| InvokeError::InvalidOutput {
                    resource: self.resource.code().to_string(),
                    detail: violation.to_string(),
                }),
            None => Ok(output),
        }
    }

    fn authorize(&self, invocation: InvocationId, input: &Value) -> InvokeResult<MiddlewareChain> {
        let required = self.resource.required_actions(input);
        let policies = self.principal.policies();

        let evaluation = match self.evaluator.evaluate(policies, &required) {
            Ok(evaluation) => evaluation,
            Err(err) => {
                self.audit_denial(invocation, &err, &[]);
                tracing::warn!(
                    invocation = %invocation,
                    principal = %self.principal.id(),
                    resource = %self.resource.code(),
                    reason = %err.reason(),
                    "Invocation not authorized"
                );
                return Err(err.into());
            },
        };

        let chain = match MiddlewareChain::build(
            &self.resource,
            evaluation.matched(),
            Arc::clone(&self.principal),
        ) {
            Ok(chain) => chain,
            Err(err) => {
                if let AuthorizationError::InvalidModifierArg { detail, .. } = &err {
                    tracing::warn!(
                        invocation = %invocation,
                        resource = %self.resource.code(),
                        detail = %detail,
                        "Modify policy argument rejected"
                    );
                }
                let modify: Vec<&Policy> = evaluation.modify_policies().collect();
                self.audit_denial(invocation, &err, &modify);
                return Err(err.into());
            },
        };

        self.audit_grant(invocation, &evaluation);
        Ok(chain)
    }

    fn record(&self, invocation: InvocationId, decision: AccessDecision) -> AccessRecord {
        AccessRecord::resource_level(
            invocation,
            self.principal.id().clone(),
            self.resource.code(),
            decision,
        )
    }

    fn audit_grant(&self, invocation: InvocationId, evaluation: &Evaluation<'_, '_>) {
        if evaluation.coverage().is_empty() {
            emit(
                self.access_log.as_ref(),
                self.record(invocation, AccessDecision::Allowed),
            );
            return;
        }

        for coverage in evaluation.coverage() {
            let decision = if coverage.is_filtered() {
                AccessDecision::Filtered
            } else {
                AccessDecision::Allowed
            };
            let record = AccessRecord::new(
                invocation,
                self.principal.id().clone(),
                self.resource.code(),
                coverage.action.path.clone(),
                coverage.action.action.clone(),
                decision,
            )
            .with_policies(coverage.policies.iter().copied().cloned().collect());
            emit(self.access_log.as_ref(), record);
        }
    }

    fn audit_denial(&self, invocation: InvocationId, err: &AuthorizationError, policies: &[&Policy]) {
        let reason = err.reason();
        let owned = || policies.iter().copied().cloned().collect::<Vec<_>>();

        match err {
            AuthorizationError::Denied { policy, action } => {
                let record = AccessRecord::new(
                    invocation,
                    self.principal.id().clone(),
                    self.resource.code(),
                    action.path.clone(),
                    action.action.clone(),
                    AccessDecision::Denied,
                )
                .with_policies(vec![(**policy).clone()])
                .with_reason(reason);
                emit(self.access_log.as_ref(), record);
            },
            AuthorizationError::Unmatched { unmatched } => {
                for action in unmatched {
                    let record = AccessRecord::new(
                        invocation,
                        self.principal.id().clone(),
                        self.resource.code(),
                        action.path.clone(),
                        action.action.clone(),
                        AccessDecision::Denied,
                    )
                    .with_reason(DenialReason::Unmatched);
                    emit(self.access_log.as_ref(), record);
                }
            },
            AuthorizationError::ResourceNotFound { .. }
            | AuthorizationError::UnknownModifier { .. }
            | AuthorizationError::InvalidModifierArg { .. } => {
                let record = self
                    .record(invocation, AccessDecision::Denied)
                    .with_policies(owned())
                    .with_reason(reason);
                emit(self.access_log.as_ref(), record);
            },
        }
    }
}

impl std::fmt::Debug for BoundInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundInvocation")
            .field("resource", &self.resource.code())
            .field("principal", self.principal.id())
            .finish_non_exhaustive()
    }
}

/// A bound invocation with `serde`-typed input and output.
pub struct TypedInvocation<I, O> {
    inner: BoundInvocation,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> TypedInvocation<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Authorize and run the resource on `input`.
    ///
    /// # Errors
    ///
    /// Everything [`BoundInvocation::call`] returns, plus
    /// [`InvokeError::Codec`] when `input` cannot be serialized or the
    /// output does not deserialize into `O`.
    pub async fn call(&self, input: &I) -> InvokeResult<O> {
        let value = serde_json::to_value(input)?;
        let output = self.inner.call(value).await?;
        Ok(serde_json::from_value(output)?)
    }

    /// The untyped invocation.
    #[must_use]
    pub fn untyped(&self) -> &BoundInvocation {
        &self.inner
    }
}

impl<I, O> Clone for TypedInvocation<I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I, O> std::fmt::Debug for TypedInvocation<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedInvocation").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{Modifier, ModifierContext, Next};
    use crate::registry::ResourceRegistry;
    use crate::schema::JsonSchemaValidator;
    use capgate_audit::MemoryAccessLog;
    use capgate_core::ActionGroup;
    use serde_json::json;

    fn setup() -> (ResourceRegistry, Arc<MemoryAccessLog>) {
        let memory = Arc::new(MemoryAccessLog::new(64));
        let registry = ResourceRegistry::new().with_access_logger(memory.clone());
        registry.register(
            Resource::builder("users", |input: &Value| {
                let mut groups = vec![ActionGroup::new(
                    format!("users/{}", input["id"]),
                    ["read"],
                )];
                if input["with_email"].as_bool().unwrap_or(false) {
                    groups.push(ActionGroup::new(
                        format!("users/{}/email", input["id"]),
                        ["read"],
                    ));
                }
                groups
            })
            .input_schema(
                JsonSchemaValidator::new(json!({
                    "type": "object",
                    "properties": {"id": {"type": "integer"}},
                    "required": ["id"]
                }))
                .unwrap(),
            )
            .output_schema(
                JsonSchemaValidator::new(json!({"type": "object", "required": ["id"]})).unwrap(),
            )
            .modifier(
                "redact",
                Modifier::new(|ctx: ModifierContext, next: Next| async move {
                    let mut output = next.run(ctx.input).await?;
                    if let Some(fields) = ctx.arg.as_array() {
                        for field in fields.iter().filter_map(Value::as_str) {
                            if let Some(map) = output.as_object_mut() {
                                map.remove(field);
                            }
                        }
                    }
                    Ok(output)
                }),
            )
            .handler(|input: Value, _principal: Arc<Principal>| async move {
                if input["id"] == json!(0) {
                    return Ok(json!({"name": "nobody"}));
                }
                Ok(json!({"id": input["id"], "email": "a@example.com"}))
            }),
        );
        (registry, memory)
    }

    #[tokio::test]
    async fn test_allowed_call_records_each_action() {
        let (registry, memory) = setup();
        let principal = Principal::new("alice", vec![Policy::allow("users/**", "read")]);

        let output = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 5, "with_email": true}))
            .await
            .unwrap();
        assert_eq!(output["email"], json!("a@example.com"));

        let records = memory.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.decision == AccessDecision::Allowed));
        assert_eq!(records[0].invocation, records[1].invocation);
        assert_eq!(records[1].path.joined(), "users/5/email");
    }

    #[tokio::test]
    async fn test_modified_call_is_filtered() {
        let (registry, memory) = setup();
        let principal = Principal::new(
            "alice",
            vec![Policy::modify("users/*", "read", "redact").with_arg(json!(["email"]))],
        );

        let output = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 5}))
            .await
            .unwrap();
        assert_eq!(output, json!({"id": 5}));
        assert_eq!(memory.count(AccessDecision::Filtered), 1);
    }

    #[tokio::test]
    async fn test_denied_call_records_denying_policy() {
        let (registry, memory) = setup();
        let principal = Principal::new(
            "alice",
            vec![
                Policy::allow("users/**", "read"),
                Policy::deny("users/*/email", "*"),
            ],
        );

        let err = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 5, "with_email": true}))
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].decision, AccessDecision::Denied);
        assert_eq!(records[0].reason, Some(DenialReason::Denied));
        assert_eq!(records[0].policies, vec![Policy::deny("users/*/email", "*")]);
    }

    #[tokio::test]
    async fn test_unmatched_records_each_uncovered_action() {
        let (registry, memory) = setup();
        let principal = Principal::anonymous("alice");

        let err = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 5, "with_email": true}))
            .await
            .unwrap_err();
        assert_eq!(
            err.as_authorization().map(AuthorizationError::reason),
            Some(DenialReason::Unmatched)
        );
        assert_eq!(memory.count(AccessDecision::Denied), 2);
    }

    #[tokio::test]
    async fn test_unknown_modifier_records_resource_level_denial() {
        let (registry, memory) = setup();
        let principal = Principal::new("alice", vec![Policy::modify("users/*", "read", "mask")]);

        let err = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 5}))
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_resource_level());
        assert_eq!(records[0].reason, Some(DenialReason::UnknownModifier));
    }

    #[tokio::test]
    async fn test_input_and_output_contracts() {
        let (registry, memory) = setup();
        let principal = Principal::new("alice", vec![Policy::allow("users/*", "read")]);
        let invocation = registry.invoke("users", &principal).unwrap();

        let err = invocation.call(json!({"id": "five"})).await.unwrap_err();
        assert!(matches!(err, InvokeError::InvalidInput { .. }));
        assert!(memory.is_empty());

        let err = invocation.call(json!({"id": 0})).await.unwrap_err();
        assert!(matches!(err, InvokeError::InvalidOutput { .. }));
    }

    #[tokio::test]
    async fn test_principal_is_snapshotted_at_bind() {
        let (registry, _memory) = setup();
        let mut principal = Principal::new("alice", vec![Policy::allow("users/*", "read")]);
        let invocation = registry.invoke("users", &principal).unwrap();

        principal = principal.with_policy(Policy::deny("users/*", "read"));
        assert_eq!(principal.policies().len(), 2);
        assert!(invocation.call(json!({"id": 1})).await.is_ok());
    }

    #[tokio::test]
    async fn test_panicking_sink_does_not_change_outcome() {
        struct Exploding;
        impl AccessLogger for Exploding {
            fn log(&self, _record: AccessRecord) {
                panic!("sink offline");
            }
        }

        let (registry, _memory) = setup();
        let registry = registry.with_access_logger(Arc::new(Exploding));
        let principal = Principal::new("alice", vec![Policy::allow("users/*", "read")]);

        let output = registry
            .invoke("users", &principal)
            .unwrap()
            .call(json!({"id": 1}))
            .await
            .unwrap();
        assert_eq!(output["id"], json!(1));
    }
}
