/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * The `email` field accepts an email address or a username. Unknown users
 * and wrong passwords get the same 401, so the response does not reveal
 * which accounts exist.
 */
use axum::{extract::State, Json};

use crate::backend::auth::users::verify_password;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::user::{AuthResponse, LoginRequest};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login handler
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let login = request.email.trim();
    tracing::info!("Login request for: {}", login);

    let user = state.store.user_by_login(login).await?.ok_or_else(|| {
        tracing::warn!("User not found: {}", login);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    if !verify_password(&request.password, &user) {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = super::issue_token(&state, &user)?;
    tracing::info!("User logged in: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.to_response(),
    }))
}
