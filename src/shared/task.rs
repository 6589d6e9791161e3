/**
 * Task Data Structures
 *
 * This module defines the task model shared by the server and the client:
 * the stored `Task` row, the editable `TaskFields`, and the request/response
 * bodies of the task endpoints.
 *
 * # Versioning
 *
 * Every task carries a `version` that starts at 1 and increases by exactly 1
 * on each successful mutation. Update requests carry the version the client
 * edited from; the server rejects the write with a conflict when it no longer
 * matches.
 *
 * # Title Rules
 *
 * Titles are trimmed, must be non-empty, at most 255 characters, unique across
 * the board, and must not collide with a status column label.
 */
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Longest accepted task title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Message returned when another task already uses the title
pub const TITLE_TAKEN: &str = "Task title must be unique";

/// Message returned when the title equals a column label
pub const TITLE_IS_LABEL: &str = "Task title cannot match column names";

/// Board column a task sits in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Todo")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// All columns in board order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Column label, also the wire and storage form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Parse a column label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == label)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == value)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as stored on the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,
    /// Board-unique title
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Column the task sits in
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Assignee, if any
    pub assigned_user_id: Option<Uuid>,
    /// User who created the task
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, starts at 1
    pub version: i64,
}

impl Task {
    /// The editable part of this task
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            assigned_user_id: self.assigned_user_id,
        }
    }
}

/// The fields a client may change on a task
///
/// Updates replace all of them at once; a missing `description` or
/// `assigned_user_id` clears the value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub assigned_user_id: Option<Uuid>,
}

impl TaskFields {
    /// Trim the title and drop blank descriptions
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self
            .description
            .filter(|description| !description.trim().is_empty());
        self
    }
}

/// Body of `POST /api/tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub assigned_user_id: Option<Uuid>,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assigned_user_id: None,
        }
    }

    pub fn into_fields(self) -> TaskFields {
        TaskFields {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            assigned_user_id: self.assigned_user_id,
        }
        .normalized()
    }
}

/// Body of `PUT /api/tasks/{id}`: the proposed fields plus the version they
/// were edited from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    #[serde(flatten)]
    pub fields: TaskFields,
    pub version: i64,
}

/// A task joined with the usernames a board needs to render it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub assigned_username: Option<String>,
    pub created_by_username: Option<String>,
}

/// Body of `POST /api/tasks/validate-title`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTitleRequest {
    pub title: String,
    #[serde(rename = "excludeId", default)]
    pub exclude_id: Option<Uuid>,
}

/// Response of `POST /api/tasks/validate-title`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateTitleResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ValidateTitleResponse {
    pub fn valid() -> Self {
        Self { valid: true, error: None }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Response of `DELETE /api/tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub message: String,
}

/// Whether `title` would be read as a column label
pub fn is_status_label(title: &str) -> bool {
    let title = title.trim();
    TaskStatus::ALL
        .iter()
        .any(|status| status.label().eq_ignore_ascii_case(title))
}

/// Check the parts of the title rules that need no knowledge of other tasks
///
/// Uniqueness is checked by the store.
pub fn validate_title(title: &str) -> Result<(), SharedError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SharedError::validation("title", "Task title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(SharedError::validation(
            "title",
            format!("Task title must be at most {} characters", MAX_TITLE_LENGTH),
        ));
    }
    if is_status_label(title) {
        return Err(SharedError::validation("title", TITLE_IS_LABEL));
    }
    Ok(())
}
