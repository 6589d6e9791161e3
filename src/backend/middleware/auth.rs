/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It verifies the bearer token, checks that the user
 * still exists, and attaches an `AuthenticatedUser` to the request.
 *
 * The token is read from the `Authorization: Bearer` header, or from a
 * `token` query parameter for event streams opened by clients that cannot
 * set headers.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from the token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

/// Bearer token from the header, or from `?token=`
fn request_token(request: &Request) -> Option<String> {
    if let Some(header) = request.headers().get(AUTHORIZATION) {
        return header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());
    }

    request.uri().query().and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "token")
            .map(|(_, value)| value.to_string())
    })
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the bearer token
/// 2. Verifies signature and expiry
/// 3. Checks the user still exists in the store
/// 4. Attaches user data to request extensions for use in handlers
///
/// Returns 401 Unauthorized if any step fails
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = request_token(&request).ok_or_else(|| {
        tracing::warn!("Missing or malformed Authorization header");
        BackendError::unauthorized("Access token required")
    })?;

    let claims = app_state.sessions.verify(&token).map_err(|e| {
        tracing::warn!("Invalid token: {}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims.user_id().ok_or_else(|| {
        tracing::warn!("Invalid user ID in token: {}", claims.sub);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let user = app_state.store.user_by_id(user_id).await?.ok_or_else(|| {
        tracing::warn!("Token for unknown user {}", user_id);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: user.email,
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Access token required")
            })?;

        Ok(AuthUser(user))
    }
}
