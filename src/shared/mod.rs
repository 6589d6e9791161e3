//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and the client. They define the JSON bodies of the REST API and
//! the events carried by board channels.
//!
//! # Overview
//!
//! The shared module is platform-agnostic and always compiled. Besides plain
//! data it holds the two pieces of logic both sides must agree on: title
//! validation and conflict resolution.

/// Task model and task endpoint bodies
pub mod task;

/// Activity log types
pub mod activity;

/// User and auth endpoint bodies
pub mod user;

/// Board events
pub mod event;

/// Shared error types
pub mod error;

/// Client-side conflict resolution
pub mod conflict;

/// Re-export commonly used types for convenience
pub use task::{
    CreateTaskRequest, Task, TaskFields, TaskPriority, TaskStatus, TaskView, UpdateTaskRequest,
};
pub use activity::{ActivityAction, ActivityEntry, ActivityView};
pub use event::{BoardEnvelope, BoardEvent, DEFAULT_BOARD};
pub use error::SharedError;
pub use conflict::{ConflictReport, FieldChoices, FieldSource, PendingConflict, Resolution, TaskField};
