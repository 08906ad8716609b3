//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_policy::prelude::*;` to import all essential types.

// Matching
pub use crate::{DEFAULT_CACHE_CAPACITY, Glob, PathMatcher, matches};

// Evaluation
pub use crate::{ActionCoverage, Evaluation, PolicyEvaluator};
