//! Backend Error Module
//!
//! This module defines the error type returned by HTTP handlers and its
//! conversion into HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # HTTP Response Conversion
//!
//! `BackendError` implements `IntoResponse`, so handlers return
//! `Result<_, BackendError>` and use `?` on store and validation errors.
//! Version conflicts render as the conflict body (`currentVersion`,
//! `currentTask`); all other errors render as `{"error", "status"}`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
