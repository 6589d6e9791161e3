/**
 * Register Handler
 *
 * POST /api/auth/register
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Hash password using bcrypt at the configured cost
 * 3. Create user in the store (duplicate username or email: 409)
 * 4. Issue a token and return it with the user
 */

use axum::{extract::State, Json};

use crate::backend::auth::users::create_account;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::user::{AuthResponse, RegisterRequest};

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - invalid username, email or password
/// * `409 Conflict` - username or email already registered
/// * `500 Internal Server Error` - hashing, storage or token failure
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    tracing::info!("Register request for username: {}, email: {}", request.username, request.email);

    let user = create_account(&state, &request.username, &request.email, &request.password)
        .await
        .inspect_err(|e| tracing::warn!("Registration rejected: {}", e))?;

    let token = super::issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: user.to_response(),
    }))
}
