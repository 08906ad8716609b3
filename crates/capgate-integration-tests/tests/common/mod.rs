//! Shared setup for integration tests.

use std::sync::Arc;

use capgate_audit::MemoryAccessLog;
use capgate_core::{ActionGroup, Principal};
use capgate_runtime::{Modifier, ModifierContext, Next, Resource, ResourceRegistry};
use capgate_test::{CallLog, tagging_modifier};
use serde_json::{Value, json};

/// A registry whose audit trail is captured in memory.
#[allow(dead_code)]
pub struct Harness {
    /// The registry under test.
    pub registry: ResourceRegistry,
    /// Captured access records.
    pub audit: Arc<MemoryAccessLog>,
    /// Order in which `users` modifiers ran.
    pub calls: CallLog,
}

#[allow(dead_code)]
impl Harness {
    /// Build a harness with the `users` resource registered.
    pub fn new() -> Self {
        capgate_test::init_test_logging();

        let audit = Arc::new(MemoryAccessLog::new(256));
        let registry = ResourceRegistry::new().with_access_logger(audit.clone());
        let calls = CallLog::new();
        registry.register(users_resource(&calls));

        Self {
            registry,
            audit,
            calls,
        }
    }
}

/// The `users` resource: requires `users#read`, returns
/// `{id, calls: ["base"]}`, and declares `first`/`second` modifiers that
/// append their code to `calls`.
#[allow(dead_code)]
pub fn users_resource(calls: &CallLog) -> Resource {
    Resource::builder("users", |_input: &Value| {
        vec![ActionGroup::new("users", ["read"])]
    })
    .modifier("first", append_call("first", calls))
    .modifier("second", append_call("second", calls))
    .modifier("tag", tagging_modifier("tag", calls))
    .handler(|input: Value, _principal: Arc<Principal>| async move {
        Ok(json!({"id": input["id"], "calls": ["base"]}))
    })
}

fn append_call(code: &'static str, log: &CallLog) -> Modifier {
    let log = log.clone();
    Modifier::new(move |ctx: ModifierContext, next: Next| {
        let log = log.clone();
        async move {
            log.push(code);
            let mut output = next.run(ctx.input).await?;
            if let Some(calls) = output["calls"].as_array_mut() {
                calls.push(json!(code));
            }
            Ok(output)
        }
    })
}
