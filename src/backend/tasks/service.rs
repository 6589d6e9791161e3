/**
 * Task Service
 *
 * The task mutations behind the REST handlers. Each mutation, once applied,
 * records an activity entry and publishes both the task change and the
 * entry to the default board, tagged with the originating client.
 *
 * # Update Order
 *
 * 1. Task must exist (404)
 * 2. Title rules: non-empty, length, not a column label, unique (400)
 * 3. Assignee must exist (400)
 * 4. Submitted version must equal the stored one (409 with current row)
 * 5. Atomic conditional write; a lost race is also a 409
 * 6. Activity entry, classified from the old and new rows
 *
 * Validation failures are reported before the version is looked at.
 */

use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{NewActivity, VersionedWrite};
use crate::shared::activity::ActivityAction;
use crate::shared::event::{BoardEvent, DEFAULT_BOARD};
use crate::shared::task::{
    validate_title, CreateTaskRequest, Task, TaskFields, TaskView, UpdateTaskRequest,
    ValidateTitleRequest, ValidateTitleResponse, TITLE_TAKEN,
};
use crate::shared::SharedError;

/// Most attempts smart-assign makes when no version was supplied
const SMART_ASSIGN_ATTEMPTS: usize = 3;

pub const NO_USERS: &str = "No users available";

/// Choose the activity kind for an applied update
///
/// - status changed: `drag_drop` with `from_status` / `to_status`
/// - else assignee changed: `assign` or `unassign`
/// - else: `update`
///
/// Details always carry `title` and `status`.
pub fn classify_update(previous: &Task, updated: &Task) -> (ActivityAction, serde_json::Value) {
    let mut details = json!({
        "title": updated.title,
        "status": updated.status,
    });

    let action = if previous.status != updated.status {
        details["from_status"] = json!(previous.status);
        details["to_status"] = json!(updated.status);
        ActivityAction::DragDrop
    } else if previous.assigned_user_id != updated.assigned_user_id {
        match updated.assigned_user_id {
            Some(assignee) => {
                details["assigned_user_id"] = json!(assignee);
                ActivityAction::Assign
            }
            None => {
                details["previous_assignee"] = json!(previous.assigned_user_id);
                ActivityAction::Unassign
            }
        }
    } else {
        ActivityAction::Update
    };

    (action, details)
}

/// Task operations on behalf of one authenticated caller
pub struct TaskService<'a> {
    state: &'a AppState,
    actor: &'a AuthenticatedUser,
    origin: Option<String>,
}

impl<'a> TaskService<'a> {
    pub fn new(state: &'a AppState, actor: &'a AuthenticatedUser, origin: Option<String>) -> Self {
        Self { state, actor, origin }
    }

    /// Title rules that involve other tasks as well as the shared ones
    async fn check_title(&self, title: &str, exclude: Option<Uuid>) -> Result<(), BackendError> {
        validate_title(title)?;
        if self.state.store.title_taken(title.trim(), exclude).await? {
            return Err(SharedError::validation("title", TITLE_TAKEN).into());
        }
        Ok(())
    }

    async fn check_assignee(&self, fields: &TaskFields) -> Result<(), BackendError> {
        if let Some(assignee) = fields.assigned_user_id {
            if self.state.store.user_by_id(assignee).await?.is_none() {
                return Err(SharedError::validation("assigned_user_id", "Assigned user does not exist").into());
            }
        }
        Ok(())
    }

    async fn view(&self, task: &Task) -> Result<TaskView, BackendError> {
        Ok(self
            .state
            .store
            .task_view(task.id)
            .await?
            .unwrap_or_else(|| TaskView {
                task: task.clone(),
                assigned_username: None,
                created_by_username: None,
            }))
    }

    fn publish(&self, event: BoardEvent) {
        self.state
            .channels
            .publish_event(DEFAULT_BOARD, self.origin.clone(), event);
    }

    /// Record an activity entry and announce it
    ///
    /// The mutation has already been applied, so a failure here is logged
    /// rather than returned.
    async fn log_activity(&self, action: ActivityAction, task_id: Uuid, details: serde_json::Value) {
        let recorded = self
            .state
            .store
            .record_activity(NewActivity {
                user_id: self.actor.user_id,
                action,
                task_id: Some(task_id),
                details,
            })
            .await;

        let entry = match recorded {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!("Failed to record {} activity for task {}: {}", action, task_id, e);
                return;
            }
        };

        match self.state.store.activity_view(entry.id).await {
            Ok(Some(view)) => self.publish(BoardEvent::ActivityLogged(view)),
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to load activity {}: {}", entry.id, e),
        }
    }

    /// Create a task at version 1
    pub async fn create(&self, request: CreateTaskRequest) -> Result<TaskView, BackendError> {
        let fields = request.into_fields();
        self.check_title(&fields.title, None).await?;
        self.check_assignee(&fields).await?;

        let task = self
            .state
            .store
            .create_task(self.actor.user_id, fields)
            .await?;
        tracing::info!("Task {} created by {}: {}", task.id, self.actor.username, task.title);

        let view = self.view(&task).await?;
        self.publish(BoardEvent::TaskCreated(view.clone()));
        self.log_activity(
            ActivityAction::Create,
            task.id,
            json!({ "title": task.title, "status": task.status }),
        )
        .await;
        Ok(view)
    }

    /// Apply an optimistic update
    pub async fn update(&self, id: Uuid, request: UpdateTaskRequest) -> Result<TaskView, BackendError> {
        let current = self
            .state
            .store
            .get_task(id)
            .await?
            .ok_or(BackendError::NotFound("Task"))?;

        let fields = request.fields.normalized();
        self.check_title(&fields.title, Some(id)).await?;
        self.check_assignee(&fields).await?;

        if request.version != current.version {
            tracing::warn!(
                "Version conflict on task {}: submitted {}, stored {}",
                id,
                request.version,
                current.version
            );
            return Err(BackendError::conflict(current));
        }

        let (previous, updated) = match self.state.store.update_task(id, request.version, fields).await? {
            VersionedWrite::Applied { previous, updated } => (previous, updated),
            VersionedWrite::Conflict(current) => {
                tracing::warn!("Task {} changed concurrently, now at version {}", id, current.version);
                return Err(BackendError::conflict(current));
            }
            VersionedWrite::NotFound => return Err(BackendError::NotFound("Task")),
        };
        tracing::info!("Task {} updated to version {} by {}", id, updated.version, self.actor.username);

        let view = self.view(&updated).await?;
        self.publish(BoardEvent::TaskUpdated(view.clone()));
        let (action, details) = classify_update(&previous, &updated);
        self.log_activity(action, id, details).await;
        Ok(view)
    }

    /// Delete a task; its activity entries are kept
    pub async fn delete(&self, id: Uuid) -> Result<Task, BackendError> {
        let task = self
            .state
            .store
            .delete_task(id)
            .await?
            .ok_or(BackendError::NotFound("Task"))?;
        tracing::info!("Task {} deleted by {}", id, self.actor.username);

        self.publish(BoardEvent::TaskDeleted { id });
        self.log_activity(
            ActivityAction::Delete,
            id,
            json!({ "title": task.title, "status": task.status }),
        )
        .await;
        Ok(task)
    }

    /// Whether `title` would be accepted, ignoring `exclude_id`
    pub async fn validate_title(&self, request: &ValidateTitleRequest) -> Result<ValidateTitleResponse, BackendError> {
        match self.check_title(&request.title, request.exclude_id).await {
            Ok(()) => Ok(ValidateTitleResponse::valid()),
            Err(BackendError::SharedError(err)) => Ok(ValidateTitleResponse::invalid(err.to_string())),
            Err(err) => Err(err),
        }
    }

    /// Assign the task to the user with the fewest open tasks
    ///
    /// With `version`, a mismatch is a conflict like any update. Without it
    /// the assignment applies to whatever version is current, re-reading up
    /// to `SMART_ASSIGN_ATTEMPTS` times when a concurrent write lands first.
    /// This is the only automatic retry; client-submitted edits never retry.
    pub async fn smart_assign(&self, id: Uuid, version: Option<i64>) -> Result<TaskView, BackendError> {
        for _ in 0..SMART_ASSIGN_ATTEMPTS {
            let task = self
                .state
                .store
                .get_task(id)
                .await?
                .ok_or(BackendError::NotFound("Task"))?;
            let user = self
                .state
                .store
                .least_loaded_user()
                .await?
                .ok_or_else(|| BackendError::bad_request(NO_USERS))?;

            let expected = version.unwrap_or(task.version);
            if expected != task.version {
                return Err(BackendError::conflict(task));
            }

            let fields = TaskFields {
                assigned_user_id: Some(user.id),
                ..task.fields()
            };
            match self.state.store.update_task(id, expected, fields).await? {
                VersionedWrite::Applied { updated, .. } => {
                    tracing::info!("Task {} smart-assigned to {} by {}", id, user.username, self.actor.username);
                    let view = self.view(&updated).await?;
                    self.publish(BoardEvent::TaskUpdated(view.clone()));
                    self.log_activity(
                        ActivityAction::SmartAssign,
                        id,
                        json!({
                            "title": updated.title,
                            "status": updated.status,
                            "assigned_user_id": user.id,
                            "assigned_to": user.username,
                        }),
                    )
                    .await;
                    return Ok(view);
                }
                VersionedWrite::Conflict(current) if version.is_some() => {
                    return Err(BackendError::conflict(current));
                }
                VersionedWrite::Conflict(_) => continue,
                VersionedWrite::NotFound => return Err(BackendError::NotFound("Task")),
            }
        }

        let current = self
            .state
            .store
            .get_task(id)
            .await?
            .ok_or(BackendError::NotFound("Task"))?;
        Err(BackendError::conflict(current))
    }
}
