/**
 * Task Handlers
 *
 * Thin HTTP layer over `TaskService`. Every route here sits behind
 * `auth_middleware`; mutations read the caller's `X-Client-Id` so the
 * resulting board events are not echoed back to the same tab.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, ClientId};
use crate::backend::server::state::AppState;
use crate::backend::tasks::service::TaskService;
use crate::shared::task::{
    CreateTaskRequest, DeleteTaskResponse, TaskView, UpdateTaskRequest, ValidateTitleRequest,
    ValidateTitleResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct SmartAssignQuery {
    pub version: Option<i64>,
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<TaskView>>, BackendError> {
    Ok(Json(state.store.list_tasks().await?))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientId(origin): ClientId,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), BackendError> {
    let task = TaskService::new(&state, &user, origin).create(request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}
///
/// A stale `version` answers 409 with the current task so the client can
/// resolve the conflict.
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientId(origin): ClientId,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskView>, BackendError> {
    let task = TaskService::new(&state, &user, origin).update(id, request).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientId(origin): ClientId,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteTaskResponse>, BackendError> {
    TaskService::new(&state, &user, origin).delete(id).await?;
    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// POST /api/tasks/validate-title
pub async fn validate_task_title(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ValidateTitleRequest>,
) -> Result<Json<ValidateTitleResponse>, BackendError> {
    let response = TaskService::new(&state, &user, None)
        .validate_title(&request)
        .await?;
    Ok(Json(response))
}

/// POST /api/tasks/smart-assign/{id}
pub async fn smart_assign(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientId(origin): ClientId,
    Path(id): Path<Uuid>,
    Query(query): Query<SmartAssignQuery>,
) -> Result<Json<TaskView>, BackendError> {
    let task = TaskService::new(&state, &user, origin)
        .smart_assign(id, query.version)
        .await?;
    Ok(Json(task))
}
