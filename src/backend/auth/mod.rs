//! Authentication Module
//!
//! This module handles user registration, login and bearer tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - Account rules, hashing, account creation
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//!     ├── register.rs - User registration handler
//!     ├── login.rs    - User authentication handler
//!     └── me.rs       - Get current user handler
//! ```
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs signed with the configured secret
//! - Invalid credentials return 401 (no information leakage)

/// Account rules and creation
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{get_me, login, register};
pub use sessions::{Claims, SessionKeys};
