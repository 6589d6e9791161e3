//! Backend Module
//!
//! This module contains all server-side code for the task board: an Axum
//! HTTP server with a versioned task API, an activity log, and a per-board
//! Server-Sent Events relay.
//!
//! This module is only compiled when the `server` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - `BoardStore` trait with PostgreSQL and in-memory backends
//! - **`auth`** - Registration, login, JWT tokens
//! - **`middleware`** - Token verification and client id extraction
//! - **`tasks`** - Task CRUD, optimistic concurrency, smart assignment
//! - **`activity`** - Activity log endpoints
//! - **`users`** - Team member endpoints
//! - **`realtime`** - Board channels, SSE subscription, relay
//! - **`error`** - Backend error type and HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── store/          - Persistence
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── tasks/          - Task service and handlers
//! ├── activity/       - Activity handlers
//! ├── users/          - User handlers
//! ├── realtime/       - Event broadcasting
//! └── error/          - Error types
//! ```
//!
//! # Thread Safety
//!
//! - `AppState` is cloned into every request; its parts are `Arc`-backed
//! - Task writes are serialized per row by the version check, not by locks
//! - `broadcast::Sender` per board for fan-out to subscribers

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Board persistence
pub mod store;

/// Real-time board events
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Task endpoints
pub mod tasks;

/// Activity endpoints
pub mod activity;

/// Team member endpoints
pub mod users;

pub use error::BackendError;
pub use realtime::BoardChannels;
pub use server::{create_app, create_app_with_state, AppState, ServerConfig};
pub use store::{BoardStore, MemoryBoardStore, PgBoardStore};
