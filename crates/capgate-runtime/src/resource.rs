//! Resource definitions.
//!
//! A resource is a named business operation: a base handler, the logic that
//! derives required actions from an input, optional input/output contracts,
//! and the modifiers policies may apply to it.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use capgate_core::{ActionGroup, Principal, RequiredAction};

use crate::modifier::Modifier;
use crate::schema::ArgValidator;

/// A resource's business logic.
///
/// Implemented for any `Fn(Value, Arc<Principal>) -> impl Future` closure.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Execute the operation.
    ///
    /// # Errors
    ///
    /// Any error the operation raises. It reaches the caller unchanged.
    async fn call(&self, input: Value, principal: Arc<Principal>) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Value, Arc<Principal>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn call(&self, input: Value, principal: Arc<Principal>) -> anyhow::Result<Value> {
        self(input, principal).await
    }
}

/// Derives the (path, actions) groups an input requires.
pub trait ActionExtractor: Send + Sync {
    /// Extract action groups from `input`.
    fn extract(&self, input: &Value) -> Vec<ActionGroup>;
}

impl<F> ActionExtractor for F
where
    F: Fn(&Value) -> Vec<ActionGroup> + Send + Sync,
{
    fn extract(&self, input: &Value) -> Vec<ActionGroup> {
        self(input)
    }
}

/// A registered business operation.
pub struct Resource {
    code: String,
    input_schema: Option<Arc<dyn ArgValidator>>,
    output_schema: Option<Arc<dyn ArgValidator>>,
    modifiers: HashMap<String, Modifier>,
    handler: Arc<dyn Handler>,
    extractor: Arc<dyn ActionExtractor>,
}

impl Resource {
    /// Start building a resource.
    ///
    /// The action extractor is mandatory: a resource that cannot say what it
    /// needs authorized cannot be guarded.
    #[must_use]
    pub fn builder<E>(code: impl Into<String>, extractor: E) -> ResourceBuilder
    where
        E: Fn(&Value) -> Vec<ActionGroup> + Send + Sync + 'static,
    {
        ResourceBuilder::with_extractor(code, Arc::new(extractor))
    }

    /// Unique resource code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Look up a declared modifier.
    #[must_use]
    pub fn modifier(&self, code: &str) -> Option<&Modifier> {
        self.modifiers.get(code)
    }

    /// Codes of all declared modifiers, sorted.
    #[must_use]
    pub fn modifier_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.modifiers.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Action groups `input` requires, as returned by the extractor.
    #[must_use]
    pub fn extract_actions(&self, input: &Value) -> Vec<ActionGroup> {
        self.extractor.extract(input)
    }

    /// Flattened required actions for `input`.
    #[must_use]
    pub fn required_actions(&self, input: &Value) -> Vec<RequiredAction> {
        ActionGroup::flatten_all(self.extract_actions(input))
    }

    /// Input contract, if declared.
    #[must_use]
    pub fn input_schema(&self) -> Option<&Arc<dyn ArgValidator>> {
        self.input_schema.as_ref()
    }

    /// Output contract, if declared.
    #[must_use]
    pub fn output_schema(&self) -> Option<&Arc<dyn ArgValidator>> {
        self.output_schema.as_ref()
    }

    pub(crate) fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("code", &self.code)
            .field("modifiers", &self.modifier_codes())
            .field("input_schema", &self.input_schema.is_some())
            .field("output_schema", &self.output_schema.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Resource`]. Finished by supplying the base handler.
pub struct ResourceBuilder {
    code: String,
    input_schema: Option<Arc<dyn ArgValidator>>,
    output_schema: Option<Arc<dyn ArgValidator>>,
    modifiers: HashMap<String, Modifier>,
    extractor: Arc<dyn ActionExtractor>,
}

impl ResourceBuilder {
    /// Start from a shared extractor.
    #[must_use]
    pub fn with_extractor(code: impl Into<String>, extractor: Arc<dyn ActionExtractor>) -> Self {
        Self {
            code: code.into(),
            input_schema: None,
            output_schema: None,
            modifiers: HashMap::new(),
            extractor,
        }
    }

    /// Validate inputs before action extraction.
    #[must_use]
    pub fn input_schema(mut self, validator: impl ArgValidator + 'static) -> Self {
        self.input_schema = Some(Arc::new(validator));
        self
    }

    /// Validate outputs after the chain returns.
    #[must_use]
    pub fn output_schema(mut self, validator: impl ArgValidator + 'static) -> Self {
        self.output_schema = Some(Arc::new(validator));
        self
    }

    /// Declare a modifier. A later declaration under the same code replaces
    /// the earlier one.
    #[must_use]
    pub fn modifier(mut self, code: impl Into<String>, modifier: Modifier) -> Self {
        self.modifiers.insert(code.into(), modifier);
        self
    }

    /// Finish with a closure base handler.
    #[must_use]
    pub fn handler<F, Fut>(self, handler: F) -> Resource
    where
        F: Fn(Value, Arc<Principal>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.build_with(Arc::new(handler))
    }

    /// Finish with a shared base handler.
    #[must_use]
    pub fn build_with(self, handler: Arc<dyn Handler>) -> Resource {
        Resource {
            code: self.code,
            input_schema: self.input_schema,
            output_schema: self.output_schema,
            modifiers: self.modifiers,
            handler,
            extractor: self.extractor,
        }
    }
}

impl std::fmt::Debug for ResourceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBuilder")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}
