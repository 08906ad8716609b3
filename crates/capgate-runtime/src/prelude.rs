//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_runtime::prelude::*;` to import all essential types.

// Errors
pub use crate::{InvokeError, InvokeResult};

// Resources
pub use crate::{ActionExtractor, Handler, Resource, ResourceBuilder, ResourceRegistry};

// Modifiers
pub use crate::{Modifier, ModifierContext, ModifierHandler, Next};

// Invocation
pub use crate::{Acquire, BoundInvocation, TypedInvocation};

// Validation
pub use crate::{ArgValidator, JsonSchemaValidator, SchemaViolation};
