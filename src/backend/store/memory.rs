/**
 * In-Memory Board Store
 *
 * Keeps the whole board in one `BoardState` behind an `Arc<RwLock<>>`.
 * Every mutation takes the write lock once, so checks made inside a mutation
 * (title uniqueness, expected version) and the write itself happen without
 * interleaving.
 *
 * Used when no database is configured or reachable, and by the tests.
 */
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::{
    BoardStore, NewActivity, NewUser, StoreError, UserRecord, VersionedWrite,
};
use crate::shared::activity::{ActivityEntry, ActivityView};
use crate::shared::task::{Task, TaskFields, TaskStatus, TaskView};

/// Board contents, in insertion order
#[derive(Debug, Default)]
struct BoardState {
    users: Vec<UserRecord>,
    tasks: Vec<Task>,
    activity: Vec<ActivityEntry>,
}

impl BoardState {
    fn user(&self, id: Uuid) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id == id)
    }

    fn username(&self, id: Uuid) -> Option<String> {
        self.user(id).map(|user| user.username.clone())
    }

    fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn title_taken(&self, title: &str, exclude: Option<Uuid>) -> bool {
        self.tasks
            .iter()
            .any(|task| task.title == title && Some(task.id) != exclude)
    }

    fn check_assignee(&self, fields: &TaskFields) -> Result<(), StoreError> {
        match fields.assigned_user_id {
            Some(id) if self.user(id).is_none() => Err(StoreError::UnknownUser(id)),
            _ => Ok(()),
        }
    }

    fn view(&self, task: &Task) -> TaskView {
        TaskView {
            task: task.clone(),
            assigned_username: task.assigned_user_id.and_then(|id| self.username(id)),
            created_by_username: self.username(task.created_by),
        }
    }

    fn activity_view(&self, entry: &ActivityEntry) -> ActivityView {
        ActivityView {
            entry: entry.clone(),
            username: self.username(entry.user_id),
            task_title: entry
                .task_id
                .and_then(|id| self.task(id))
                .map(|task| task.title.clone()),
        }
    }
}

/// Board store held in process memory
#[derive(Clone, Default)]
pub struct MemoryBoardStore {
    state: Arc<RwLock<BoardState>>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|existing| existing.username == user.username || existing.email == user.email)
        {
            return Err(StoreError::DuplicateUser);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
            last_seen_activity: None,
        };
        state.users.push(record.clone());
        Ok(record)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.state.read().await.user(id).cloned())
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.read().await;
        let found = state
            .users
            .iter()
            .find(|user| user.email == login)
            .or_else(|| state.users.iter().find(|user| user.username == login));
        Ok(found.cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut users = self.state.read().await.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn set_last_seen(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(StoreError::UnknownUser(user_id))?;
        user.last_seen_activity = Some(at);
        Ok(())
    }

    async fn create_task(&self, created_by: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        let mut state = self.state.write().await;
        if state.title_taken(&fields.title, None) {
            return Err(StoreError::DuplicateTitle);
        }
        state.check_assignee(&fields)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            assigned_user_id: fields.assigned_user_id,
            created_by,
            created_at: now,
            updated_at: now,
            version: 1,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.state.read().await.task(id).cloned())
    }

    async fn task_view(&self, id: Uuid) -> Result<Option<TaskView>, StoreError> {
        let state = self.state.read().await;
        Ok(state.task(id).map(|task| state.view(task)))
    }

    async fn list_tasks(&self) -> Result<Vec<TaskView>, StoreError> {
        let state = self.state.read().await;
        let mut views: Vec<TaskView> = state.tasks.iter().rev().map(|task| state.view(task)).collect();
        views.sort_by(|a, b| b.task.created_at.cmp(&a.task.created_at));
        Ok(views)
    }

    async fn title_taken(&self, title: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self.state.read().await.title_taken(title, exclude))
    }

    async fn update_task(
        &self,
        id: Uuid,
        expected_version: i64,
        fields: TaskFields,
    ) -> Result<VersionedWrite, StoreError> {
        let mut state = self.state.write().await;
        let Some(index) = state.tasks.iter().position(|task| task.id == id) else {
            return Ok(VersionedWrite::NotFound);
        };

        let previous = state.tasks[index].clone();
        if previous.version != expected_version {
            return Ok(VersionedWrite::Conflict(previous));
        }
        if state.title_taken(&fields.title, Some(id)) {
            return Err(StoreError::DuplicateTitle);
        }
        state.check_assignee(&fields)?;

        let task = &mut state.tasks[index];
        task.title = fields.title;
        task.description = fields.description;
        task.status = fields.status;
        task.priority = fields.priority;
        task.assigned_user_id = fields.assigned_user_id;
        task.updated_at = Utc::now();
        task.version = previous.version + 1;

        Ok(VersionedWrite::Applied {
            previous,
            updated: task.clone(),
        })
    }

    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let mut state = self.state.write().await;
        let index = state.tasks.iter().position(|task| task.id == id);
        Ok(index.map(|index| state.tasks.remove(index)))
    }

    async fn least_loaded_user(&self) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.read().await;
        let open_tasks = |user_id: Uuid| {
            state
                .tasks
                .iter()
                .filter(|task| task.assigned_user_id == Some(user_id) && task.status != TaskStatus::Done)
                .count()
        };
        Ok(state
            .users
            .iter()
            .min_by(|a, b| {
                open_tasks(a.id)
                    .cmp(&open_tasks(b.id))
                    .then_with(|| a.username.cmp(&b.username))
            })
            .cloned())
    }

    async fn record_activity(&self, activity: NewActivity) -> Result<ActivityEntry, StoreError> {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id: activity.user_id,
            action: activity.action,
            task_id: activity.task_id,
            details: activity.details,
            created_at: Utc::now(),
        };
        self.state.write().await.activity.push(entry.clone());
        Ok(entry)
    }

    async fn activity_view(&self, id: Uuid) -> Result<Option<ActivityView>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .activity
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| state.activity_view(entry)))
    }

    async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityView>, StoreError> {
        let state = self.state.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state
            .activity
            .iter()
            .rev()
            .take(limit)
            .map(|entry| state.activity_view(entry))
            .collect())
    }

    async fn unseen_activity_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        let count = state
            .activity
            .iter()
            .filter(|entry| entry.user_id != user_id)
            .filter(|entry| since.map_or(true, |since| entry.created_at > since))
            .count();
        Ok(count as i64)
    }
}
