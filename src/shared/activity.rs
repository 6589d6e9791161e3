/**
 * Activity Log Types
 *
 * Activity entries are immutable records written as a side effect of task
 * mutations. They are never updated, and they outlive the task they describe.
 */
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user did to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    /// Status change, i.e. the card was dragged to another column
    DragDrop,
    Assign,
    Unassign,
    SmartAssign,
    Delete,
}

impl ActivityAction {
    pub const ALL: [ActivityAction; 7] = [
        ActivityAction::Create,
        ActivityAction::Update,
        ActivityAction::DragDrop,
        ActivityAction::Assign,
        ActivityAction::Unassign,
        ActivityAction::SmartAssign,
        ActivityAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::DragDrop => "drag_drop",
            Self::Assign => "assign",
            Self::Unassign => "unassign",
            Self::SmartAssign => "smart_assign",
            Self::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One activity log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: Uuid,
    /// Actor
    pub user_id: Uuid,
    pub action: ActivityAction,
    /// Affected task; kept after the task is deleted
    pub task_id: Option<Uuid>,
    /// Structured detail, shape depends on `action`
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An entry joined with the actor's username and the task's current title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityView {
    #[serde(flatten)]
    pub entry: ActivityEntry,
    pub username: Option<String>,
    /// `None` once the task has been deleted
    pub task_title: Option<String>,
}

/// Response of `GET /api/activity/unseen-count`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnseenCountResponse {
    pub count: i64,
}

/// Response of `POST /api/activity/mark-seen`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkSeenResponse {
    pub success: bool,
}
