//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every kind maps to a stable HTTP status at the API boundary, so callers
/// never need to inspect the message to recover intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Required configuration is missing. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The document store could not be reached. Callers may retry.
    #[error("connection error: {0}")]
    Connection(String),

    /// A field failed validation; nothing was persisted.
    #[error("validation error on `{field}`: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Human-readable description of the failure.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{0}")]
    ReferentialIntegrity(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An uncategorized persistence or transport failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Builds a `Validation` error for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the offending field for validation errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
