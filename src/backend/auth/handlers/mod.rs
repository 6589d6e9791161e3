//! Authentication Handlers Module
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register - create an account
//! - **`login`** - POST /api/auth/login - exchange credentials for a token
//! - **`get_me`** - GET /api/auth/me - current user
//!
//! Register and login both answer `{token, user}`; the token goes into the
//! `Authorization: Bearer` header of every other request.

use axum::http::StatusCode;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::UserRecord;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

pub use login::login;
pub use me::get_me;
pub use register::register;

fn issue_token(state: &AppState, user: &UserRecord) -> Result<String, BackendError> {
    state.sessions.issue(user).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })
}
