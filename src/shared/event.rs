/**
 * Board Event System
 *
 * This module defines the typed events that flow over a board channel.
 * Events are wrapped in a `BoardEnvelope` that records which client
 * originated them, so the relay can skip the sender.
 *
 * # Wire Format
 *
 * ```json
 * {
 *   "board": "board",
 *   "origin": "tab-42",
 *   "event": {"event": "task-updated", "data": {...}},
 *   "timestamp": "2024-01-01T00:00:00Z"
 * }
 * ```
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::activity::ActivityView;
use crate::shared::task::TaskView;

/// Board every client joins unless it names another
pub const DEFAULT_BOARD: &str = "board";

/// Request header naming the client (tab) that issued a mutation
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// A change other clients of the board should apply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum BoardEvent {
    TaskCreated(TaskView),
    TaskUpdated(TaskView),
    TaskDeleted { id: Uuid },
    ActivityLogged(ActivityView),
}

impl BoardEvent {
    /// Event name, used as the SSE event field
    pub fn name(&self) -> &'static str {
        match self {
            Self::TaskCreated(_) => "task-created",
            Self::TaskUpdated(_) => "task-updated",
            Self::TaskDeleted { .. } => "task-deleted",
            Self::ActivityLogged(_) => "activity-logged",
        }
    }
}

/// A board event plus routing metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardEnvelope {
    /// Board channel name
    pub board: String,
    /// Client id of the sender, if known
    pub origin: Option<String>,
    pub event: BoardEvent,
    /// RFC3339 time the event entered the relay
    pub timestamp: String,
}

impl BoardEnvelope {
    pub fn new(board: impl Into<String>, origin: Option<String>, event: BoardEvent) -> Self {
        Self {
            board: board.into(),
            origin,
            event,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whether a subscriber identified by `client_id` should receive this
    ///
    /// Subscribers never get their own events back; anonymous subscribers
    /// get everything.
    pub fn is_for(&self, client_id: Option<&str>) -> bool {
        match (self.origin.as_deref(), client_id) {
            (Some(origin), Some(client)) => origin != client,
            _ => true,
        }
    }
}

/// Body of `POST /api/board/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
    pub client_id: String,
    #[serde(default)]
    pub board: Option<String>,
    pub event: BoardEvent,
}

/// Response of `POST /api/board/events`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayResponse {
    /// Number of live subscriptions the event reached (sender included)
    pub delivered: usize,
}
