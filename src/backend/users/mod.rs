//! Users Module
//!
//! Team member listing and creation.

pub mod handlers;

pub use handlers::{add_member, list_users};
