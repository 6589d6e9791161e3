/**
 * API Route Handlers
 *
 * This module defines the route tables for the board API.
 *
 * # Routes
 *
 * ## Public
 * - `GET /health` - Liveness and storage backend
 * - `POST /api/auth/register` - User registration
 * - `POST /api/auth/login` - User login
 *
 * ## Authenticated
 * - `GET /api/auth/me` - Current user
 * - `GET|POST /api/tasks` - List, create
 * - `PUT|DELETE /api/tasks/{id}` - Versioned update, delete
 * - `POST /api/tasks/validate-title` - Title check
 * - `POST /api/tasks/smart-assign/{id}` - Assign to least-loaded user
 * - `GET /api/activity` - Recent activity
 * - `GET /api/activity/unseen-count` - Unseen entries
 * - `POST /api/activity/mark-seen` - Mark all seen
 * - `GET|POST /api/users` - List, add teammate
 * - `GET|POST /api/board/events` - SSE stream, relay
 */

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::backend::activity::{list_activity, mark_seen, unseen_count};
use crate::backend::auth::{get_me, login, register};
use crate::backend::realtime::{relay_event, subscribe_board};
use crate::backend::server::state::AppState;
use crate::backend::tasks::{create_task, delete_task, list_tasks, smart_assign, update_task, validate_task_title};
use crate::backend::users::{add_member, list_users};

/// Health check (GET /health)
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "storage": state.store.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Routes reachable without a token
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes that need `auth_middleware` in front of them
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/me", get(get_me))
        // Tasks
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/validate-title", post(validate_task_title))
        .route("/api/tasks/smart-assign/{id}", post(smart_assign))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        // Activity
        .route("/api/activity", get(list_activity))
        .route("/api/activity/unseen-count", get(unseen_count))
        .route("/api/activity/mark-seen", post(mark_seen))
        // Users
        .route("/api/users", get(list_users).post(add_member))
        // Board events
        .route("/api/board/events", get(subscribe_board).post(relay_event))
}
