//! Evently: API error types.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use evently_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The store could not be connected or migrated at startup.
    #[error("database error: {0}")]
    Database(DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The tracing pipeline could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// The offending field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A domain or store failure.
    Domain(DomainError),
    /// The request body could not be read, for example because it is over
    /// the size limit. Carries the status the extractor reported.
    Body {
        /// Response status.
        status: StatusCode,
        /// Reason the body was rejected.
        message: String,
    },
}

impl ApiError {
    /// A 400 for request data rejected before it reaches the facade.
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Domain(DomainError::validation(field, message))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Body {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Domain(err) => err,
            Self::Body { status, message } => {
                let error_code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "payload_too_large"
                } else {
                    "invalid_body"
                };
                let body = ErrorBody {
                    error: error_code,
                    message,
                    field: None,
                };
                return (status, Json(body)).into_response();
            }
        };

        let (status, error_code) = match &err {
            DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::ReferentialIntegrity(_) => {
                (StatusCode::BAD_REQUEST, "referential_integrity_error")
            }
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            DomainError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            DomainError::Connection(_) => (StatusCode::INTERNAL_SERVER_ERROR, "connection_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        if status.is_server_error() {
            error!(error = %err, "request failed");
        }

        // Validation messages are written for end users; send them bare.
        let (message, field) = match err {
            DomainError::Validation { field, message } => (message, Some(field)),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: error_code,
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}
