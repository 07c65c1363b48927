//! Unified error types for the analytics collector.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the analytics collector.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema validation failure with field-level detail.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown session: {0}")]
    SessionNotFound(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error from a single message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Serialization(_) => 400,
            Self::MissingField(_) => 400,
            Self::SessionNotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Field-level detail for 400 responses, if any.
    pub fn details(&self) -> Option<&[String]> {
        match self {
            Self::Validation(details) => Some(details),
            _ => None,
        }
    }
}
