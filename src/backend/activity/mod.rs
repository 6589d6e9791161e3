//! Activity Module
//!
//! The board's audit trail. Entries are written by the task service after
//! each applied mutation; this module only serves them.

/// HTTP handlers for activity endpoints
pub mod handlers;

pub use handlers::{list_activity, mark_seen, unseen_count, RECENT_ACTIVITY_LIMIT};
