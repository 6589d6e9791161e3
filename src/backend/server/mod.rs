//! Server Module
//!
//! This module contains the server-side code for initializing and
//! configuring the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Environment configuration and store selection
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **Store Selection**: PostgreSQL when reachable, memory otherwise
//! 3. **State Creation**: store, board channels, token keys
//! 4. **Background Tasks**: idle channel sweep
//! 5. **Router Creation**: routes, auth, CORS, tracing

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{create_app, create_app_with_state};
pub use state::AppState;
