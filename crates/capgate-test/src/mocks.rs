//! Mock handlers and modifiers that record what ran.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use capgate_core::Principal;
use capgate_runtime::{Handler, Modifier, ModifierContext, Next};

/// Shared, ordered log of calls.
///
/// Uses `std::sync::Mutex` so it can be inspected without a runtime.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// Snapshot of all entries in call order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A modifier that logs `tag` on entry, runs the inner chain, then appends
/// `tag` to the output's `tags` array (created if missing on an object).
#[must_use]
pub fn tagging_modifier(tag: &str, log: &CallLog) -> Modifier {
    let tag = tag.to_string();
    let log = log.clone();
    Modifier::new(move |ctx: ModifierContext, next: Next| {
        let tag = tag.clone();
        let log = log.clone();
        async move {
            log.push(tag.clone());
            let mut output = next.run(ctx.input).await?;
            if let Some(map) = output.as_object_mut() {
                let tags = map.entry("tags").or_insert_with(|| json!([]));
                if let Some(tags) = tags.as_array_mut() {
                    tags.push(json!(tag));
                }
            }
            Ok(output)
        }
    })
}

/// Base handler that counts calls and returns `{"calls": n}` merged over an
/// object input.
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a handler with a zero count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the handler has run.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for CountingHandler {
    async fn call(&self, input: Value, _principal: Arc<Principal>) -> anyhow::Result<Value> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut output = if input.is_object() {
            input
        } else {
            json!({ "input": input })
        };
        if let Some(map) = output.as_object_mut() {
            map.insert("calls".to_string(), json!(previous.saturating_add(1)));
        }
        Ok(output)
    }
}

/// A [`CountingHandler`] and a shared handle for registering it.
#[must_use]
pub fn counting_handler() -> (Arc<dyn Handler>, CountingHandler) {
    let handler = CountingHandler::new();
    (Arc::new(handler.clone()), handler)
}
