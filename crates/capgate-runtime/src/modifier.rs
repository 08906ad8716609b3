//! Modifiers - middleware triggered by modify policies.
//!
//! A modifier wraps the rest of the chain. It receives the validated policy
//! argument, the principal, and the input, plus a [`Next`] handle to the
//! inner chain. It may rewrite the input, rewrite the output, call `next`
//! several times, or not call it at all.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use capgate_core::Principal;

use crate::chain::Link;
use crate::schema::ArgValidator;

/// What a modifier sees when it runs.
#[derive(Debug, Clone)]
pub struct ModifierContext {
    /// The policy argument after schema validation (`Null` if absent).
    pub arg: Value,
    /// The principal the invocation runs as.
    pub principal: Arc<Principal>,
    /// Input as received from the outer layer.
    pub input: Value,
}

/// Handle to the inner part of the chain.
#[derive(Clone)]
pub struct Next {
    link: Arc<Link>,
    principal: Arc<Principal>,
}

impl Next {
    pub(crate) fn new(link: Arc<Link>, principal: Arc<Principal>) -> Self {
        Self { link, principal }
    }

    /// Forward `input` to the inner chain as the current principal.
    ///
    /// # Errors
    ///
    /// Returns whatever the inner modifiers or base handler return.
    pub async fn run(&self, input: Value) -> anyhow::Result<Value> {
        Link::call(Arc::clone(&self.link), input, Arc::clone(&self.principal)).await
    }

    /// Forward `input` to the inner chain as a different principal.
    ///
    /// Authorization is not re-evaluated; the chain was built for the
    /// original principal.
    ///
    /// # Errors
    ///
    /// Returns whatever the inner modifiers or base handler return.
    pub async fn run_as(&self, input: Value, principal: Arc<Principal>) -> anyhow::Result<Value> {
        Link::call(Arc::clone(&self.link), input, principal).await
    }

    /// The principal `run` forwards as.
    #[must_use]
    pub fn principal(&self) -> &Arc<Principal> {
        &self.principal
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("principal", self.principal.id())
            .field("depth", &self.link.depth())
            .finish()
    }
}

/// Modifier behaviour.
///
/// Implemented for any `Fn(ModifierContext, Next) -> impl Future` closure.
#[async_trait]
pub trait ModifierHandler: Send + Sync {
    /// Run the modifier.
    ///
    /// # Errors
    ///
    /// Errors propagate unchanged to the caller of the invocation.
    async fn handle(&self, ctx: ModifierContext, next: Next) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> ModifierHandler for F
where
    F: Fn(ModifierContext, Next) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn handle(&self, ctx: ModifierContext, next: Next) -> anyhow::Result<Value> {
        self(ctx, next).await
    }
}

/// A modifier declared by a resource.
#[derive(Clone)]
pub struct Modifier {
    arg_schema: Option<Arc<dyn ArgValidator>>,
    handler: Arc<dyn ModifierHandler>,
}

impl Modifier {
    /// Create a modifier from a closure.
    #[must_use]
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(ModifierContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::from_handler(Arc::new(handler))
    }

    /// Create a modifier from a shared handler.
    #[must_use]
    pub fn from_handler(handler: Arc<dyn ModifierHandler>) -> Self {
        Self {
            arg_schema: None,
            handler,
        }
    }

    /// Require policy arguments to pass `validator`.
    #[must_use]
    pub fn with_arg_schema(mut self, validator: impl ArgValidator + 'static) -> Self {
        self.arg_schema = Some(Arc::new(validator));
        self
    }

    /// The argument validator, if any.
    #[must_use]
    pub fn arg_schema(&self) -> Option<&Arc<dyn ArgValidator>> {
        self.arg_schema.as_ref()
    }

    pub(crate) fn handler(&self) -> &Arc<dyn ModifierHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modifier")
            .field("has_arg_schema", &self.arg_schema.is_some())
            .finish_non_exhaustive()
    }
}
