//! Taskboard - Main Library
//!
//! Taskboard is a collaborative to-do board: teammates authenticate, create and
//! edit tasks, drag them between status columns and see each other's changes
//! in near real time.
//!
//! # Overview
//!
//! This library provides:
//! - A REST API over a relational task store (PostgreSQL or in-memory)
//! - Optimistic concurrency for task updates (per-task version counters)
//! - A typed broadcast relay that fans board events out to connected clients
//! - A Rust client that resolves version conflicts and resubmits
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Task, activity and user wire types
//!   - Board events
//!   - Title validation and the conflict resolver
//!
//! - **`client`** - HTTP client for the board API (`reqwest`)
//!
//! - **`backend`** - Server-side code (only compiled with the `server` feature)
//!   - Axum HTTP server, configuration and state
//!   - Task store (PostgreSQL via sqlx, or in-memory)
//!   - Authentication (bcrypt + JWT)
//!   - Task, activity and user handlers
//!   - Server-Sent Events board relay
//!
//! # Feature Flags
//!
//! - **`server`** (default) - enables the `backend` module and the
//!   `taskboard-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use taskboard::backend::server::config::ServerConfig;
//! use taskboard::backend::server::init::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - **Server**: state is shared through `Arc`s and `broadcast::Sender`s held
//!   in a cloneable `AppState`; there is no global mutable state
//! - **Client**: `BoardClient` wraps a `reqwest::Client` and is cheap to clone

/// Shared types and data structures
pub mod shared;

/// HTTP client for the board API
pub mod client;

/// Backend server-side code
#[cfg(feature = "server")]
pub mod backend;
