/**
 * Accounts
 *
 * Registration rules, password hashing and account creation. Used by the
 * register endpoint and by `POST /api/users` (teammates added with the
 * configured default password).
 */

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::{NewUser, UserRecord};
use crate::shared::SharedError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check username, email and password against the account rules
pub fn validate_account(username: &str, email: &str, password: &str) -> Result<(), SharedError> {
    if !is_valid_username(username) {
        return Err(SharedError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    if !email.contains('@') {
        return Err(SharedError::validation("email", "Invalid email format"));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(SharedError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

/// Validate, hash and store a new account
pub async fn create_account(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserRecord, BackendError> {
    let username = username.trim();
    let email = email.trim();
    validate_account(username, email, password)?;

    let password_hash = bcrypt::hash(password, state.config.bcrypt_cost).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::handler(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    let user = state
        .store
        .create_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    tracing::info!("User created: {} ({})", user.username, user.email);
    Ok(user)
}

/// Check a password against a stored hash; malformed hashes never match
pub fn verify_password(password: &str, user: &UserRecord) -> bool {
    bcrypt::verify(password, &user.password_hash).unwrap_or_else(|e| {
        tracing::error!("Password verification error for {}: {:?}", user.username, e);
        false
    })
}
