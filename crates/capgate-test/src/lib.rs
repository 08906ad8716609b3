//! Capgate Test - Shared test utilities.
//!
//! Fixtures for principals, policies, and resources, plus mocks that record
//! what ran. Meant to be pulled in as a dev-dependency.
//!
//! ```toml
//! [dev-dependencies]
//! capgate-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use capgate_test::{allow, echo_resource, test_principal};
//! use capgate_runtime::{Acquire, ResourceRegistry};
//!
//! #[tokio::test]
//! async fn test_echo() {
//!     let registry = ResourceRegistry::new();
//!     registry.register(echo_resource("echo"));
//!
//!     let principal = test_principal(vec![allow("echo", "read")]);
//!     let output = principal.acquire(&registry, "echo").unwrap()
//!         .call(serde_json::json!({"id": 1}))
//!         .await
//!         .unwrap();
//!     assert_eq!(output["id"], 1);
//! }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

/// Install a test-friendly `tracing` subscriber.
///
/// Honors `RUST_LOG`, writes through the test harness capture, and is safe
/// to call from every test.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
