/**
 * User and Authentication Wire Types
 *
 * Request and response bodies of the auth and user endpoints. None of these
 * carry credential hashes.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Register request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterRequest {
    /// 3-30 chars, starts with a letter, letters/digits/underscore
    pub username: String,
    pub email: String,
    /// At least 6 characters, hashed before storage
    pub password: String,
}

/// Login request
///
/// `email` may also hold a username.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub user: UserResponse,
}

/// A user without sensitive data
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Body of `POST /api/users`: add a teammate
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CreateMemberRequest {
    pub username: String,
    pub email: String,
}

/// Response of `POST /api/users`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMemberResponse {
    pub user: UserResponse,
    pub message: String,
}
