//! Tasks Module
//!
//! Board tasks with optimistic concurrency. Every task carries a `version`
//! that starts at 1 and grows by one per applied update; an update naming
//! any other version is refused with the current task attached.
//!
//! # Module Structure
//!
//! ```text
//! tasks/
//! ├── mod.rs      - Module exports and documentation
//! ├── service.rs  - Validation, versioned writes, activity, events
//! └── handlers.rs - HTTP handlers
//! ```

/// Task operations
pub mod service;

/// HTTP handlers for task endpoints
pub mod handlers;

pub use handlers::{create_task, delete_task, list_tasks, smart_assign, update_task, validate_task_title};
pub use service::{classify_update, TaskService};
