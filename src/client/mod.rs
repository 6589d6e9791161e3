//! Board Client
//!
//! Typed async client for the board server. It speaks the REST API, follows
//! a board's event stream, and drives conflict resolution: a rejected update
//! comes back as a [`PendingConflict`](crate::shared::PendingConflict) that is
//! settled with a [`Resolution`](crate::shared::Resolution).

pub mod board;
pub mod error;
pub mod events;

pub use board::{BoardClient, TaskUpdate};
pub use error::ClientError;
pub use events::BoardEventStream;
