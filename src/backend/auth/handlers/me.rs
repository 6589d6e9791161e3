/**
 * Get Current User Handler
 *
 * GET /api/auth/me, behind `auth_middleware`.
 */

use axum::{extract::State, Json};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::user::UserResponse;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let user = state
        .store
        .user_by_id(auth.user_id)
        .await?
        .ok_or(BackendError::NotFound("User"))?;
    Ok(Json(user.to_response()))
}
