//! The resource registry.
//!
//! Owns every registered [`Resource`] and is the single place where a
//! principal is bound to one. Registration is expected to finish before
//! traffic starts, but the map sits behind a read-mostly lock so late
//! registration is still safe.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use capgate_audit::{
    AccessDecision, AccessLogger, AccessRecord, FanoutAccessLogger, MemoryAccessLog,
    NullAccessLogger, TracingAccessLogger,
};
use capgate_config::Config;
use capgate_core::{AuthorizationError, AuthorizationResult, DenialReason, InvocationId, Principal};
use capgate_policy::{PathMatcher, PolicyEvaluator};

use crate::invocation::{BoundInvocation, emit};
use crate::resource::Resource;

/// Registry of resources keyed by code.
pub struct ResourceRegistry {
    resources: RwLock<BTreeMap<String, Arc<Resource>>>,
    evaluator: PolicyEvaluator,
    access_log: Arc<dyn AccessLogger>,
    memory_log: Option<Arc<MemoryAccessLog>>,
}

impl ResourceRegistry {
    /// Create an empty registry that audits through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(BTreeMap::new()),
            evaluator: PolicyEvaluator::default(),
            access_log: Arc::new(TracingAccessLogger::new()),
            memory_log: None,
        }
    }

    /// Build a registry from configuration: matcher cache size and the
    /// `[audit]` sinks.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let matcher = Arc::new(PathMatcher::with_capacity(config.matcher.cache_capacity));
        let audit = &config.audit;

        let mut registry = Self::new().with_matcher(matcher);
        if !audit.enabled {
            return registry.with_access_logger(Arc::new(NullAccessLogger));
        }

        let mut fanout = FanoutAccessLogger::new();
        if audit.sink.uses_tracing() {
            fanout = fanout.with_sink(Arc::new(TracingAccessLogger::new()));
        }
        if audit.sink.uses_memory() {
            let memory = Arc::new(MemoryAccessLog::new(audit.memory_capacity));
            fanout = fanout.with_sink(memory.clone());
            registry.memory_log = Some(memory);
        }

        tracing::debug!(
            sink = %audit.sink,
            cache_capacity = config.matcher.cache_capacity,
            "Registry configured"
        );
        registry.with_access_logger(Arc::new(fanout))
    }

    /// Use a specific matcher (e.g. to share its cache between registries).
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<PathMatcher>) -> Self {
        self.evaluator = PolicyEvaluator::new(matcher);
        self
    }

    /// Send access records to `logger`.
    #[must_use]
    pub fn with_access_logger(mut self, logger: Arc<dyn AccessLogger>) -> Self {
        self.access_log = logger;
        self
    }

    /// The in-memory audit sink, when configured through [`Self::from_config`].
    #[must_use]
    pub fn memory_log(&self) -> Option<&Arc<MemoryAccessLog>> {
        self.memory_log.as_ref()
    }

    /// The shared pattern matcher.
    #[must_use]
    pub fn matcher(&self) -> &Arc<PathMatcher> {
        self.evaluator.matcher()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<Resource>>> {
        self.resources.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<Resource>>> {
        self.resources.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a resource.
    ///
    /// Idempotent by code: if the code is already taken, the existing
    /// registration is returned and `resource` is dropped unused.
    pub fn register(&self, resource: Resource) -> Arc<Resource> {
        let mut resources = self.write();
        match resources.entry(resource.code().to_string()) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    resource = %existing.key(),
                    "Resource already registered, keeping first registration"
                );
                Arc::clone(existing.get())
            },
            Entry::Vacant(slot) => {
                tracing::info!(
                    resource = %slot.key(),
                    modifiers = ?resource.modifier_codes(),
                    "Resource registered"
                );
                Arc::clone(slot.insert(Arc::new(resource)))
            },
        }
    }

    /// Look up a resource by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<Arc<Resource>> {
        self.read().get(code).cloned()
    }

    /// Whether a code is registered.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.read().contains_key(code)
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All registered resources, ordered by code.
    #[must_use]
    pub fn list_resources(&self) -> Vec<Arc<Resource>> {
        self.read().values().cloned().collect()
    }

    /// Bind `principal` to the resource registered under `code`.
    ///
    /// The principal is snapshotted; later changes to the caller's copy do
    /// not affect the returned invocation. Authorization itself runs on each
    /// call, against the actions that call's input requires.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::ResourceNotFound`] if `code` is not
    /// registered.
    pub fn invoke(&self, code: &str, principal: &Principal) -> AuthorizationResult<BoundInvocation> {
        let Some(resource) = self.get(code) else {
            tracing::warn!(
                principal = %principal.id(),
                resource = %code,
                "Invocation of unknown resource"
            );
            emit(
                self.access_log.as_ref(),
                AccessRecord::resource_level(
                    InvocationId::new(),
                    principal.id().clone(),
                    code,
                    AccessDecision::Denied,
                )
                .with_reason(DenialReason::ResourceNotFound),
            );
            return Err(AuthorizationError::not_found(code));
        };

        Ok(BoundInvocation::new(
            resource,
            Arc::new(principal.clone()),
            self.evaluator.clone(),
            Arc::clone(&self.access_log),
        ))
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
