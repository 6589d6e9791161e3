/**
 * User Handlers
 *
 * GET /api/users lists everyone a task can be assigned to.
 * POST /api/users adds a teammate with the configured default password.
 */

use axum::{extract::State, http::StatusCode, Json};

use crate::backend::auth::users::create_account;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::user::{CreateMemberRequest, CreateMemberResponse, UserResponse};

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<UserResponse>>, BackendError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(|user| user.to_response()).collect()))
}

/// Add a teammate
///
/// # Errors
///
/// * `400 Bad Request` - invalid username or email
/// * `409 Conflict` - username or email already registered
pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<CreateMemberResponse>), BackendError> {
    let password = state.config.default_member_password.clone();
    let user = create_account(&state, &request.username, &request.email, &password).await?;
    tracing::info!("{} added teammate {}", auth.username, user.username);

    Ok((
        StatusCode::CREATED,
        Json(CreateMemberResponse {
            user: user.to_response(),
            message: format!("User {} created with the default password", user.username),
        }),
    ))
}
