//! Invocation error types.

use capgate_core::AuthorizationError;
use thiserror::Error;

/// Errors returned by a bound invocation.
///
/// Only [`InvokeError::Unauthorized`] is an authorization outcome. Handler
/// failures pass through untouched so callers can downcast them to whatever
/// the resource raised.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The principal may not perform this invocation.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    /// The base handler or a modifier failed.
    #[error(transparent)]
    Handler(anyhow::Error),

    /// The input does not satisfy the resource's input schema.
    #[error("invalid input for resource '{resource}': {detail}")]
    InvalidInput {
        /// Resource code.
        resource: String,
        /// Validator message.
        detail: String,
    },

    /// The handler produced output that fails the resource's output schema.
    #[error("invalid output from resource '{resource}': {detail}")]
    InvalidOutput {
        /// Resource code.
        resource: String,
        /// Validator message.
        detail: String,
    },

    /// Typed input or output could not be converted to or from JSON.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl InvokeError {
    /// Whether a transport should answer "forbidden".
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// The authorization failure, if this is one.
    #[must_use]
    pub fn as_authorization(&self) -> Option<&AuthorizationError> {
        match self {
            Self::Unauthorized(err) => Some(err),
            _ => None,
        }
    }

    /// Downcast a handler failure to the concrete error the resource raised.
    #[must_use]
    pub fn downcast_handler<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Handler(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type for invocations.
pub type InvokeResult<T> = Result<T, InvokeError>;
