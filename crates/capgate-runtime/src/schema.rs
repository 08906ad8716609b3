//! Value validation at the resource boundary.
//!
//! Resources and modifiers declare validators for their inputs, outputs, and
//! modifier arguments. Any type implementing [`ArgValidator`] works; the
//! JSON Schema implementation covers the common case.

use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", errors.join("; "))]
pub struct SchemaViolation {
    errors: Vec<String>,
}

impl SchemaViolation {
    /// A violation with a single message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    /// A violation with several messages.
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// Individual validator messages.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Validates (and may normalize) a JSON value.
///
/// Returns the value to use downstream, which lets a validator fill in
/// defaults or coerce types.
pub trait ArgValidator: Send + Sync {
    /// Validate `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] describing why the value was rejected.
    fn validate(&self, value: &Value) -> Result<Value, SchemaViolation>;
}

impl<F> ArgValidator for F
where
    F: Fn(&Value) -> Result<Value, SchemaViolation> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<Value, SchemaViolation> {
        self(value)
    }
}

/// JSON Schema (draft 2020-12) validator.
pub struct JsonSchemaValidator {
    schema: Value,
    validator: Validator,
}

impl JsonSchemaValidator {
    /// Compile a schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] if the schema itself is invalid.
    pub fn new(schema: Value) -> Result<Self, SchemaViolation> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| SchemaViolation::new(format!("invalid schema: {err}")))?;
        Ok(Self { schema, validator })
    }

    /// The schema document.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ArgValidator for JsonSchemaValidator {
    fn validate(&self, value: &Value) -> Result<Value, SchemaViolation> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|err| err.to_string())
            .collect();
        if errors.is_empty() {
            Ok(value.clone())
        } else {
            Err(SchemaViolation::from_errors(errors))
        }
    }
}
