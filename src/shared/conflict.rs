//! # Conflict Resolution
//!
//! Client-side half of the optimistic-concurrency protocol. When the server
//! rejects an update because the task moved on, it answers with a
//! [`ConflictReport`] holding the authoritative row and its version. The user
//! then picks a [`Resolution`]:
//!
//! - **AcceptServer**: drop the local edit, keep what the server has
//! - **AcceptMine**: push the local edit over the server row
//! - **Merge**: choose, per field, the local or the server value
//!
//! Every resolution is resubmitted under `current_version` from the report, so
//! the retry targets the latest known state instead of the stale version that
//! caused the conflict.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::task::{Task, TaskFields, UpdateTaskRequest};

/// `error` value of a conflict response
pub const CONFLICT_ERROR: &str = "Conflict detected";

/// Body of a 409 response to `PUT /api/tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConflictReport {
    pub error: String,
    #[serde(rename = "currentVersion")]
    pub current_version: i64,
    #[serde(rename = "currentTask")]
    pub current_task: Task,
}

impl ConflictReport {
    pub fn new(current_task: Task) -> Self {
        Self {
            error: CONFLICT_ERROR.to_string(),
            current_version: current_task.version,
            current_task,
        }
    }
}

/// An editable task field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Priority,
    Assignee,
}

impl TaskField {
    pub const ALL: [TaskField; 5] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Status,
        TaskField::Priority,
        TaskField::Assignee,
    ];
}

/// Where a merged field takes its value from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldSource {
    /// The local draft
    #[default]
    Mine,
    /// The row in the conflict report
    Server,
}

/// Per-field choices for a merge; every field defaults to the local value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChoices {
    pub title: FieldSource,
    pub description: FieldSource,
    pub status: FieldSource,
    pub priority: FieldSource,
    pub assignee: FieldSource,
}

impl FieldChoices {
    /// Take every field from `source`
    pub fn all(source: FieldSource) -> Self {
        Self {
            title: source,
            description: source,
            status: source,
            priority: source,
            assignee: source,
        }
    }

    pub fn with(mut self, field: TaskField, source: FieldSource) -> Self {
        *self.slot(field) = source;
        self
    }

    pub fn source(&self, field: TaskField) -> FieldSource {
        match field {
            TaskField::Title => self.title,
            TaskField::Description => self.description,
            TaskField::Status => self.status,
            TaskField::Priority => self.priority,
            TaskField::Assignee => self.assignee,
        }
    }

    fn slot(&mut self, field: TaskField) -> &mut FieldSource {
        match field {
            TaskField::Title => &mut self.title,
            TaskField::Description => &mut self.description,
            TaskField::Status => &mut self.status,
            TaskField::Priority => &mut self.priority,
            TaskField::Assignee => &mut self.assignee,
        }
    }
}

/// How the user settled a conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the server row, discarding the local edit
    AcceptServer,
    /// Keep the local edit
    AcceptMine,
    /// Field-by-field choice
    Merge(FieldChoices),
}

impl Resolution {
    /// The fields to resubmit
    pub fn merged_fields(&self, mine: &TaskFields, server: &TaskFields) -> TaskFields {
        match self {
            Self::AcceptServer => server.clone(),
            Self::AcceptMine => mine.clone(),
            Self::Merge(choices) => {
                let pick = |field: TaskField| choices.source(field) == FieldSource::Server;
                TaskFields {
                    title: if pick(TaskField::Title) { server.title.clone() } else { mine.title.clone() },
                    description: if pick(TaskField::Description) {
                        server.description.clone()
                    } else {
                        mine.description.clone()
                    },
                    status: if pick(TaskField::Status) { server.status } else { mine.status },
                    priority: if pick(TaskField::Priority) { server.priority } else { mine.priority },
                    assigned_user_id: if pick(TaskField::Assignee) {
                        server.assigned_user_id
                    } else {
                        mine.assigned_user_id
                    },
                }
            }
        }
    }

    /// Build the resubmission for a conflict, always under the reported version
    pub fn resolve(&self, mine: &TaskFields, report: &ConflictReport) -> UpdateTaskRequest {
        UpdateTaskRequest {
            fields: self.merged_fields(mine, &report.current_task.fields()),
            version: report.current_version,
        }
    }
}

/// Fields whose local and server values differ
pub fn differing_fields(mine: &TaskFields, server: &TaskFields) -> Vec<TaskField> {
    TaskField::ALL
        .into_iter()
        .filter(|field| match field {
            TaskField::Title => mine.title != server.title,
            TaskField::Description => mine.description != server.description,
            TaskField::Status => mine.status != server.status,
            TaskField::Priority => mine.priority != server.priority,
            TaskField::Assignee => mine.assigned_user_id != server.assigned_user_id,
        })
        .collect()
}

/// A rejected edit waiting for the user's decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConflict {
    pub task_id: Uuid,
    /// The local draft that was rejected
    pub mine: TaskFields,
    pub report: ConflictReport,
}

impl PendingConflict {
    pub fn new(task_id: Uuid, mine: TaskFields, report: ConflictReport) -> Self {
        Self { task_id, mine, report }
    }

    /// Fields the user actually has to choose between
    pub fn differences(&self) -> Vec<TaskField> {
        differing_fields(&self.mine, &self.report.current_task.fields())
    }

    pub fn resolve(&self, resolution: &Resolution) -> UpdateTaskRequest {
        resolution.resolve(&self.mine, &self.report)
    }
}
