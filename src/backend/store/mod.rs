//! Board Storage
//!
//! The [`BoardStore`] trait is the persistence seam of the server. Two
//! implementations share identical semantics:
//!
//! - **`postgres`** - `sqlx` PostgreSQL pool with embedded migrations
//! - **`memory`** - a single `RwLock`-guarded board, used when no database is
//!   configured or reachable, and by the test suites
//!
//! # Versioned Writes
//!
//! [`BoardStore::update_task`] compares the expected version and writes in one
//! atomic step. Two writers racing with the same version can never both get
//! [`VersionedWrite::Applied`]; the loser sees [`VersionedWrite::Conflict`]
//! with the winner's row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::activity::{ActivityAction, ActivityEntry, ActivityView};
use crate::shared::task::{Task, TaskFields, TaskView, TITLE_TAKEN};
use crate::shared::user::UserResponse;

pub mod memory;
pub mod postgres;

pub use memory::MemoryBoardStore;
pub use postgres::PgBoardStore;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another task already has this title
    #[error("{}", TITLE_TAKEN)]
    DuplicateTitle,

    /// Username or email already registered
    #[error("Username or email already exists")]
    DuplicateUser,

    /// A referenced user does not exist
    #[error("User {0} does not exist")]
    UnknownUser(Uuid),

    /// A stored value could not be mapped back to a model type
    #[error("Invalid stored value: {0}")]
    InvalidRow(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// A stored user, credential hash included
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    /// Last time the user looked at the activity feed
    pub last_seen_activity: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Input for [`BoardStore::create_user`]
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Input for [`BoardStore::record_activity`]
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub task_id: Option<Uuid>,
    pub details: serde_json::Value,
}

/// Outcome of a versioned task write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedWrite {
    /// Written; the task now carries `expected + 1`
    Applied { previous: Task, updated: Task },
    /// The stored version differs; nothing was written
    Conflict(Task),
    NotFound,
}

/// Persistence operations of the board
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Short backend name reported by `/health`
    fn backend_name(&self) -> &'static str;

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Look up by email, falling back to username
    async fn user_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError>;

    /// All users ordered by username
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    async fn set_last_seen(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Insert a task at version 1
    ///
    /// Fails with [`StoreError::DuplicateTitle`] if the title is taken.
    async fn create_task(&self, created_by: Uuid, fields: TaskFields) -> Result<Task, StoreError>;

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn task_view(&self, id: Uuid) -> Result<Option<TaskView>, StoreError>;

    /// All tasks, newest first
    async fn list_tasks(&self) -> Result<Vec<TaskView>, StoreError>;

    /// Whether a task other than `exclude` uses `title`
    async fn title_taken(&self, title: &str, exclude: Option<Uuid>) -> Result<bool, StoreError>;

    /// Replace the editable fields if the stored version equals `expected_version`
    async fn update_task(
        &self,
        id: Uuid,
        expected_version: i64,
        fields: TaskFields,
    ) -> Result<VersionedWrite, StoreError>;

    /// Remove a task, returning the removed row
    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// User with the fewest assigned tasks not in `Done`, ties by username
    async fn least_loaded_user(&self) -> Result<Option<UserRecord>, StoreError>;

    async fn record_activity(&self, activity: NewActivity) -> Result<ActivityEntry, StoreError>;

    async fn activity_view(&self, id: Uuid) -> Result<Option<ActivityView>, StoreError>;

    /// Latest `limit` entries, newest first
    async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityView>, StoreError>;

    /// Entries by users other than `user_id` created after `since`
    ///
    /// With no `since`, every such entry counts.
    async fn unseen_activity_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, StoreError>;
}
