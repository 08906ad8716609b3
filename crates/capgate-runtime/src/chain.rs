//! Middleware chain composition.
//!
//! The chain starts as the resource's base handler. Matched modify policies
//! are applied in reverse principal order, each wrapping the chain built so
//! far, so the first-listed policy ends up outermost: it runs first on the
//! way in and sees the output last on the way out.

use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

use capgate_core::{AuthorizationError, AuthorizationResult, Policy, Principal};

use crate::modifier::{ModifierContext, ModifierHandler, Next};
use crate::resource::{Handler, Resource};

/// One layer of a composed chain.
pub(crate) enum Link {
    Base(Arc<dyn Handler>),
    Wrap {
        handler: Arc<dyn ModifierHandler>,
        arg: Value,
        inner: Arc<Link>,
    },
}

impl Link {
    /// Run this layer and everything inside it.
    pub(crate) fn call(
        link: Arc<Self>,
        input: Value,
        principal: Arc<Principal>,
    ) -> BoxFuture<'static, anyhow::Result<Value>> {
        Box::pin(async move {
            match &*link {
                Self::Base(handler) => handler.call(input, principal).await,
                Self::Wrap {
                    handler,
                    arg,
                    inner,
                } => {
                    let ctx = ModifierContext {
                        arg: arg.clone(),
                        principal: Arc::clone(&principal),
                        input,
                    };
                    let next = Next::new(Arc::clone(inner), principal);
                    handler.handle(ctx, next).await
                },
            }
        })
    }

    /// Number of modifier layers around the base handler.
    pub(crate) fn depth(&self) -> usize {
        let mut depth: usize = 0;
        let mut link = self;
        while let Self::Wrap { inner, .. } = link {
            depth = depth.saturating_add(1);
            link = inner;
        }
        depth
    }
}

/// A composed, ready-to-run chain for one authorization pass.
pub(crate) struct MiddlewareChain {
    head: Arc<Link>,
    principal: Arc<Principal>,
}

impl MiddlewareChain {
    /// Compose `resource`'s base handler with the modifiers named by the
    /// matched modify policies.
    ///
    /// Allow policies contribute nothing here.
    pub(crate) fn build(
        resource: &Resource,
        matched: &[&Policy],
        principal: Arc<Principal>,
    ) -> AuthorizationResult<Self> {
        let mut head = Arc::new(Link::Base(Arc::clone(resource.handler())));

        for policy in matched.iter().rev() {
            let Some((code, arg)) = policy.modifier() else {
                continue;
            };

            let modifier =
                resource
                    .modifier(code)
                    .ok_or_else(|| AuthorizationError::UnknownModifier {
                        resource: resource.code().to_string(),
                        modifier: code.to_string(),
                    })?;

            let raw = arg.cloned().unwrap_or(Value::Null);
            let arg = match modifier.arg_schema() {
                Some(schema) => schema.validate(&raw).map_err(|violation| {
                    AuthorizationError::InvalidModifierArg {
                        resource: resource.code().to_string(),
                        modifier: code.to_string(),
                        detail: violation.to_string(),
                    }
                })?,
                None => raw,
            };

            head = Arc::new(Link::Wrap {
                handler: Arc::clone(modifier.handler()),
                arg,
                inner: head,
            });
        }

        Ok(Self { head, principal })
    }

    /// Run the chain.
    pub(crate) async fn execute(&self, input: Value) -> anyhow::Result<Value> {
        Link::call(Arc::clone(&self.head), input, Arc::clone(&self.principal)).await
    }

    /// Number of modifiers applied.
    pub(crate) fn depth(&self) -> usize {
        self.head.depth()
    }
}
