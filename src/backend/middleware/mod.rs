//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - bearer-token authentication for protected routes, plus the
//!   `AuthUser` extractor handlers use to read the caller
//! - **`client_id`** - the `ClientId` extractor that reads `X-Client-Id`

pub mod auth;
pub mod client_id;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
pub use client_id::ClientId;
