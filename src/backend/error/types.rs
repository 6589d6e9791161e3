/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler.
 * Each variant maps to one status code; see `status_code()`.
 *
 * # Error Categories
 *
 * ## Validation
 *
 * Bad titles, malformed registration data, unknown assignees. Returned
 * synchronously as 400 before any state changes.
 *
 * ## Conflicts
 *
 * A versioned write whose version no longer matches. Not a failure: the
 * response hands the authoritative row back so the client can resolve.
 *
 * ## Storage
 *
 * Unexpected store failures are logged in full and reported to the caller
 * with a generic message.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::task::Task;
use crate::shared::SharedError;

/// Generic message for 500 responses
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Invalid input, from the shared validation rules
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// The named resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Versioned write rejected; carries the current row
    #[error("Conflict detected at version {}", .0.version)]
    Conflict(Box<Task>),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(current: Task) -> Self {
        Self::Conflict(Box::new(current))
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `SharedError` - 400
    /// - `Unauthorized` - 401
    /// - `NotFound` - 404
    /// - `Conflict` - 409
    /// - `Store` - 400 / 409 for constraint violations, 500 otherwise
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(err) => match err {
                StoreError::DuplicateTitle | StoreError::UnknownUser(_) => StatusCode::BAD_REQUEST,
                StoreError::DuplicateUser => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message sent to the client
    ///
    /// Internal failures never leak their detail here.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Store(StoreError::UnknownUser(_)) => "Assigned user does not exist".to_string(),
            Self::Store(_) if self.status_code().is_server_error() => {
                INTERNAL_ERROR.to_string()
            }
            other => other.to_string(),
        }
    }
}
