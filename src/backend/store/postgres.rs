/**
 * PostgreSQL Board Store
 *
 * `sqlx` implementation of `BoardStore`. Schema lives in `migrations/` and is
 * applied with `sqlx::migrate!` on connect.
 *
 * # Versioned Writes
 *
 * The update is a conditional statement:
 *
 * ```sql
 * UPDATE tasks SET ..., version = version + 1 WHERE id = $id AND version = $expected
 * ```
 *
 * Zero affected rows means the task is gone or another writer got there
 * first; the row is re-read to tell the two apart.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::backend::store::{
    BoardStore, NewActivity, NewUser, StoreError, UserRecord, VersionedWrite,
};
use crate::shared::activity::{ActivityAction, ActivityEntry, ActivityView};
use crate::shared::task::{Task, TaskFields, TaskPriority, TaskStatus, TaskView};

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.priority, \
     t.assigned_user_id, t.created_by, t.created_at, t.updated_at, t.version";

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, last_seen_activity";

/// Board store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgBoardStore {
    pool: PgPool,
}

impl PgBoardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("Database connection pool created successfully");
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Database migrations completed successfully");
        Ok(Self::new(pool))
    }

    async fn fetch_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM tasks t WHERE t.id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(task_from_row).transpose()
    }
}

fn task_from_row(row: &PgRow) -> Result<Task, StoreError> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: TaskStatus::from_label(&status)
            .ok_or_else(|| StoreError::InvalidRow(format!("task status {:?}", status)))?,
        priority: TaskPriority::parse(&priority)
            .ok_or_else(|| StoreError::InvalidRow(format!("task priority {:?}", priority)))?,
        assigned_user_id: row.try_get("assigned_user_id")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
    })
}

fn task_view_from_row(row: &PgRow) -> Result<TaskView, StoreError> {
    Ok(TaskView {
        task: task_from_row(row)?,
        assigned_username: row.try_get("assigned_username")?,
        created_by_username: row.try_get("created_by_username")?,
    })
}

fn activity_from_row(row: &PgRow) -> Result<ActivityEntry, StoreError> {
    let action: String = row.try_get("action")?;
    Ok(ActivityEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        action: ActivityAction::parse(&action)
            .ok_or_else(|| StoreError::InvalidRow(format!("activity action {:?}", action)))?,
        task_id: row.try_get("task_id")?,
        details: row.try_get("details")?,
        created_at: row.try_get("created_at")?,
    })
}

fn activity_view_from_row(row: &PgRow) -> Result<ActivityView, StoreError> {
    Ok(ActivityView {
        entry: activity_from_row(row)?,
        username: row.try_get("username")?,
        task_title: row.try_get("task_title")?,
    })
}

/// Map constraint violations on `tasks` to domain errors
fn task_write_error(err: sqlx::Error, fields: &TaskFields) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::DuplicateTitle;
        }
        if db.is_foreign_key_violation() {
            if let Some(id) = fields.assigned_user_id {
                return StoreError::UnknownUser(id);
            }
        }
    }
    StoreError::Database(err)
}

fn task_view_query(filter: &str) -> String {
    format!(
        "SELECT {}, a.username AS assigned_username, c.username AS created_by_username \
         FROM tasks t \
         LEFT JOIN users a ON a.id = t.assigned_user_id \
         LEFT JOIN users c ON c.id = t.created_by \
         {}",
        TASK_COLUMNS, filter
    )
}

fn activity_view_query(filter: &str) -> String {
    format!(
        "SELECT l.id, l.user_id, l.action, l.task_id, l.details, l.created_at, \
                u.username, t.title AS task_title \
         FROM activity_logs l \
         LEFT JOIN users u ON u.id = l.user_id \
         LEFT JOIN tasks t ON t.id = l.task_id \
         {}",
        filter
    )
}

#[async_trait]
impl BoardStore for PgBoardStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let result = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, username, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::DuplicateUser),
            Err(err) => Err(err.into()),
        }
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1 OR username = $1 \
             ORDER BY (email = $1) DESC LIMIT 1",
            USER_COLUMNS
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn set_last_seen(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET last_seen_activity = $1 WHERE id = $2")
            .bind(at)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownUser(user_id));
        }
        Ok(())
    }

    async fn create_task(&self, created_by: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO tasks AS t (id, title, description, status, priority, assigned_user_id, \
                                     created_by, created_at, updated_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, 1) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.status.label())
        .bind(fields.priority.as_str())
        .bind(fields.assigned_user_id)
        .bind(created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| task_write_error(err, &fields))?;
        task_from_row(&row)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.fetch_task(id).await
    }

    async fn task_view(&self, id: Uuid) -> Result<Option<TaskView>, StoreError> {
        let row = sqlx::query(&task_view_query("WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(task_view_from_row).transpose()
    }

    async fn list_tasks(&self) -> Result<Vec<TaskView>, StoreError> {
        let rows = sqlx::query(&task_view_query("ORDER BY t.created_at DESC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(task_view_from_row).collect()
    }

    async fn title_taken(&self, title: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE title = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(title)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update_task(
        &self,
        id: Uuid,
        expected_version: i64,
        fields: TaskFields,
    ) -> Result<VersionedWrite, StoreError> {
        let Some(previous) = self.fetch_task(id).await? else {
            return Ok(VersionedWrite::NotFound);
        };
        if previous.version != expected_version {
            return Ok(VersionedWrite::Conflict(previous));
        }

        let row = sqlx::query(&format!(
            "UPDATE tasks AS t \
             SET title = $1, description = $2, status = $3, priority = $4, \
                 assigned_user_id = $5, updated_at = $6, version = t.version + 1 \
             WHERE t.id = $7 AND t.version = $8 \
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.status.label())
        .bind(fields.priority.as_str())
        .bind(fields.assigned_user_id)
        .bind(Utc::now())
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| task_write_error(err, &fields))?;

        match row {
            Some(row) => Ok(VersionedWrite::Applied {
                previous,
                updated: task_from_row(&row)?,
            }),
            // Lost the race between the read and the write
            None => Ok(match self.fetch_task(id).await? {
                Some(current) => VersionedWrite::Conflict(current),
                None => VersionedWrite::NotFound,
            }),
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM tasks AS t WHERE t.id = $1 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(task_from_row).transpose()
    }

    async fn least_loaded_user(&self) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT u.id, u.username, u.email, u.password_hash, u.created_at, u.last_seen_activity \
             FROM users u \
             LEFT JOIN tasks t ON t.assigned_user_id = u.id AND t.status <> 'Done' \
             GROUP BY u.id \
             ORDER BY COUNT(t.id) ASC, u.username ASC \
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn record_activity(&self, activity: NewActivity) -> Result<ActivityEntry, StoreError> {
        let row = sqlx::query(
            "INSERT INTO activity_logs (id, user_id, action, task_id, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, action, task_id, details, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(activity.user_id)
        .bind(activity.action.as_str())
        .bind(activity.task_id)
        .bind(&activity.details)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        activity_from_row(&row)
    }

    async fn activity_view(&self, id: Uuid) -> Result<Option<ActivityView>, StoreError> {
        let row = sqlx::query(&activity_view_query("WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(activity_view_from_row).transpose()
    }

    async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityView>, StoreError> {
        let rows = sqlx::query(&activity_view_query("ORDER BY l.created_at DESC LIMIT $1"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(activity_view_from_row).collect()
    }

    async fn unseen_activity_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_logs \
             WHERE user_id <> $1 AND ($2::timestamptz IS NULL OR created_at > $2)",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
