//! Capgate Runtime - Resources, modifiers, and authorized invocation.
//!
//! This crate provides:
//! - [`Resource`], a named operation with a base handler, an action
//!   extractor, optional input/output contracts, and declared modifiers
//! - [`ResourceRegistry`], which owns resources and binds principals to them
//! - [`BoundInvocation`], which authorizes each call and runs the composed
//!   middleware chain
//!
//! # Invocation Flow
//!
//! 1. `registry.invoke(code, &principal)` looks the resource up and
//!    snapshots the principal
//! 2. Each `call(input)` validates the input, extracts required actions, and
//!    evaluates the principal's policies against them
//! 3. Matched modify policies wrap the base handler, first-listed outermost
//! 4. One access record per covered action is sent to the audit sink
//! 5. The chain runs and its output is validated
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use capgate_core::{ActionGroup, Policy, Principal};
//! use capgate_runtime::{Acquire, Resource, ResourceRegistry};
//! use serde_json::{Value, json};
//!
//! let registry = ResourceRegistry::new();
//! registry.register(
//!     Resource::builder("users", |input: &Value| {
//!         vec![ActionGroup::new(format!("users/{}", input["id"]), ["read"])]
//!     })
//!     .handler(|input: Value, _principal: Arc<Principal>| async move {
//!         Ok(json!({"id": input["id"]}))
//!     }),
//! );
//!
//! let alice = Principal::new("alice", vec![Policy::allow("users/*", "read")]);
//! let lookup = alice.acquire(&registry, "users").unwrap();
//!
//! let user = futures::executor::block_on(lookup.call(json!({"id": 123}))).unwrap();
//! assert_eq!(user, json!({"id": 123}));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod chain;
mod error;
mod invocation;
mod modifier;
mod principal;
mod registry;
mod resource;
mod schema;

pub use error::{InvokeError, InvokeResult};
pub use invocation::{BoundInvocation, TypedInvocation};
pub use modifier::{Modifier, ModifierContext, ModifierHandler, Next};
pub use principal::Acquire;
pub use registry::ResourceRegistry;
pub use resource::{ActionExtractor, Handler, Resource, ResourceBuilder};
pub use schema::{ArgValidator, JsonSchemaValidator, SchemaViolation};
