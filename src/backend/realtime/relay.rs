/**
 * Board Relay Handler
 *
 * `POST /api/board/events` lets a client push an event to everyone else on
 * a board without a persisted mutation behind it, e.g. a local drag that
 * other tabs should mirror. The sender's `client_id` becomes the envelope
 * origin, so its own subscription skips it.
 */

use axum::{extract::State, Json};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::broadcast::BoardChannels;
use crate::shared::event::{RelayRequest, RelayResponse, DEFAULT_BOARD};

pub async fn relay_event(
    State(channels): State<BoardChannels>,
    AuthUser(user): AuthUser,
    Json(request): Json<RelayRequest>,
) -> Result<Json<RelayResponse>, BackendError> {
    if request.client_id.trim().is_empty() {
        return Err(BackendError::bad_request("client_id is required"));
    }

    let board = request
        .board
        .filter(|board| !board.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BOARD.to_string());

    tracing::debug!("[Board] {} relaying {} on {}", user.username, request.event.name(), board);
    let delivered = channels.publish_event(&board, Some(request.client_id), request.event);
    Ok(Json(RelayResponse { delivered }))
}
