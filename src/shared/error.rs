//! Shared Error Types
//!
//! This module defines error types that are shared between the server and the
//! client. They represent failures that both sides detect the same way, such
//! as an invalid task title.
//!
//! # Usage
//!
//! ```rust
//! use taskboard::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "Task title must be unique");
//! assert_eq!(error.field(), "title");
//! ```
use thiserror::Error;

/// Shared error types that can occur on both server and client
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    ///
    /// The display form is the bare message so it can be shown to users as-is.
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The offending field
    pub fn field(&self) -> &str {
        match self {
            Self::ValidationError { field, .. } => field,
        }
    }
}
