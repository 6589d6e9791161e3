//! Real-time Board Module
//!
//! Pushes board changes to every connected client over Server-Sent Events.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Per-board broadcast channels
//! ├── subscription.rs - SSE subscription handler
//! └── relay.rs        - Client-to-board relay handler
//! ```
//!
//! # Event Sources
//!
//! - Task handlers publish `task-created`, `task-updated`, `task-deleted` and
//!   `activity-logged` to the default board after each applied mutation
//! - Clients relay their own events through `POST /api/board/events`
//!
//! Either way the envelope carries the sender's client id and the sender's
//! own subscription skips it. Events are not persisted; a client that
//! reconnects reloads the board over REST.

/// Per-board broadcast channels
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

/// Relay handler
pub mod relay;

pub use broadcast::{BoardChannels, BoardSubscription};
pub use relay::relay_event;
pub use subscription::subscribe_board;
