/**
 * Activity Handlers
 *
 * - GET /api/activity - latest entries, newest first
 * - GET /api/activity/unseen-count - entries by others since the caller last looked
 * - POST /api/activity/mark-seen - move the caller's last-seen mark to now
 */

use axum::{extract::State, Json};
use chrono::Utc;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::activity::{ActivityView, MarkSeenResponse, UnseenCountResponse};

/// Number of entries the activity panel shows
pub const RECENT_ACTIVITY_LIMIT: i64 = 20;

pub async fn list_activity(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<ActivityView>>, BackendError> {
    Ok(Json(state.store.recent_activity(RECENT_ACTIVITY_LIMIT).await?))
}

pub async fn unseen_count(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<UnseenCountResponse>, BackendError> {
    let user = state
        .store
        .user_by_id(auth.user_id)
        .await?
        .ok_or(BackendError::NotFound("User"))?;

    let count = state
        .store
        .unseen_activity_count(user.id, user.last_seen_activity)
        .await?;
    Ok(Json(UnseenCountResponse { count }))
}

pub async fn mark_seen(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<MarkSeenResponse>, BackendError> {
    state.store.set_last_seen(auth.user_id, Utc::now()).await?;
    tracing::debug!("{} marked activity as seen", auth.username);
    Ok(Json(MarkSeenResponse { success: true }))
}
