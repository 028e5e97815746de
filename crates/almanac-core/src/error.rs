//! Error types for Almanac.
//!
//! [`ApiError`] is the single error type surfaced by resource
//! operations. Two variants are domain-level (`NotFound`, `Forbidden`);
//! the rest cover input and infrastructure faults at the boundary.
//!
//! Every variant maps to an HTTP status and a serializable
//! [`ErrorBody`] envelope of the form `{"type": ..., "message": ...}`.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard error type for Almanac resource operations.
///
/// Failures are detected at the precondition (authorization first, then
/// existence) and propagated with `?` to the server boundary, where they
/// are translated into an HTTP response.
///
/// # Example
///
/// ```
/// use almanac_core::ApiError;
/// use http::StatusCode;
///
/// let err = ApiError::not_found("Book", 7);
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "Book with id 7 not found");
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// Lookup by identifier found no matching record.
    ///
    /// The message format is fixed; clients and tests rely on it.
    #[error("{kind} with id {id} not found")]
    NotFound {
        /// The record kind that was searched (e.g. "Book").
        kind: &'static str,
        /// The identifier that was not found.
        id: i64,
    },

    /// Caller lacks the required role tier.
    #[error("{message}")]
    Forbidden {
        /// Human-readable denial reason.
        message: String,
    },

    /// Malformed input (non-integer id, missing field, invalid JSON).
    ///
    /// Input that cannot be coerced is rejected, never guessed at.
    #[error("{message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Internal failure (store backend, response serialization).
    #[error("{message}")]
    Internal {
        /// Human-readable error message. Details stay in the logs.
        message: String,
    },
}

impl ApiError {
    /// Creates a not-found error for a record kind and identifier.
    #[must_use]
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the exception-style type name used in the response body.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "EntityNotFoundException",
            Self::Forbidden { .. } => "AccessDeniedException",
            Self::BadRequest { .. } => "BadRequestException",
            Self::Internal { .. } => "InternalServerError",
        }
    }

    /// Converts this error into its serializable response body.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error_type: self.error_type().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable error envelope for HTTP responses.
///
/// Serializes as `{"type": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Exception-style type name (e.g. `EntityNotFoundException`).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable error message.
    pub message: String,
}
