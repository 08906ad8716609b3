//! Capgate Policy - Path matching and policy resolution.
//!
//! This crate provides:
//! - A glob engine for resource paths and action names (`*`, `**`, `?`,
//!   character classes, and the `!( ) @( ) +( ) *( ) ?( )` extended groups)
//! - [`PathMatcher`], which memoizes compiled patterns across evaluations
//! - [`PolicyEvaluator`], which resolves a principal's policies against the
//!   required actions of one invocation
//!
//! # Evaluation Rules
//!
//! 1. Every required action is checked against every policy, in policy order
//! 2. The first matching deny fails the evaluation immediately
//! 3. Every required action needs at least one matching allow or modify policy
//! 4. All matching policies are kept, not just the first per action
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use capgate_core::{Policy, RequiredAction};
//! use capgate_policy::{PathMatcher, PolicyEvaluator};
//!
//! let evaluator = PolicyEvaluator::new(Arc::new(PathMatcher::new()));
//! let policies = vec![Policy::allow("users/*", "rea*")];
//! let required = vec![RequiredAction::new("users/123", "read")];
//!
//! let evaluation = evaluator.evaluate(&policies, &required).unwrap();
//! assert_eq!(evaluation.matched().len(), 1);
//!
//! let denied = vec![Policy::deny("users/**", "*"), Policy::allow("users/*", "read")];
//! assert!(evaluator.evaluate(&denied, &required).is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod evaluator;
mod glob;
mod matcher;

pub use evaluator::{ActionCoverage, Evaluation, PolicyEvaluator};
pub use glob::{Glob, matches};
pub use matcher::{DEFAULT_CACHE_CAPACITY, PathMatcher};
