//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_audit::prelude::*;` to import all essential types.

// Records
pub use crate::{AccessDecision, AccessRecord};

// Sinks
pub use crate::{
    AccessLogger, FanoutAccessLogger, MemoryAccessLog, NullAccessLogger, TracingAccessLogger,
};
