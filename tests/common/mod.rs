//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - In-memory test apps
//! - Authentication test helpers
//! - Custom assertion macros


#[cfg(feature = "server")]
pub use app::*;
#[cfg(feature = "server")]
pub use auth_helpers::*;
