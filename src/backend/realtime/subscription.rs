/**
 * Board Subscription Handler
 *
 * This module implements the Server-Sent Events handler for
 * `GET /api/board/events`. Each connection joins one board channel and
 * receives every envelope published there except the ones it sent itself.
 *
 * # Query Parameters
 *
 * - `client_id` - identifies the tab; its own relayed events are skipped
 * - `board` - board channel name, defaults to `board`
 * - `token` - bearer token, for clients that cannot set headers
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: task-updated
 * data: {"board":"board","origin":"tab-1","event":{"event":"task-updated","data":{...}},"timestamp":"..."}
 * ```
 *
 * # Connection Management
 *
 * - Keep-alive comments are injected by axum while the board is quiet
 * - Lagged subscribers skip the missed events and stay connected
 */

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{stream, Stream};
use serde::Deserialize;

use crate::backend::middleware::AuthUser;
use crate::backend::realtime::broadcast::{BoardChannels, BoardSubscription};
use crate::shared::event::DEFAULT_BOARD;

#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub client_id: Option<String>,
    pub board: Option<String>,
}

/// Render an envelope as an SSE event named after the board event
fn to_sse_event(envelope: &crate::shared::event::BoardEnvelope) -> Option<Event> {
    match serde_json::to_string(envelope) {
        Ok(data) => Some(Event::default().event(envelope.event.name()).data(data)),
        Err(e) => {
            tracing::error!("[Board] Failed to serialize {}: {:?}", envelope.event.name(), e);
            None
        }
    }
}

/// Stream of SSE events for one subscription
pub fn board_stream(subscription: BoardSubscription) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(subscription, |mut subscription| async move {
        loop {
            let envelope = subscription.next().await?;
            if let Some(event) = to_sse_event(&envelope) {
                return Some((Ok(event), subscription));
            }
        }
    })
}

/// Handle board subscription (GET /api/board/events)
pub async fn subscribe_board(
    State(channels): State<BoardChannels>,
    AuthUser(user): AuthUser,
    Query(query): Query<SubscribeQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let board = query
        .board
        .filter(|board| !board.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BOARD.to_string());
    let client_id = query.client_id.filter(|id| !id.is_empty());

    tracing::info!(
        "[Board] {} subscribed to {} as {}",
        user.username,
        board,
        client_id.as_deref().unwrap_or("anonymous")
    );

    let subscription = channels.subscribe(&board, client_id);
    Sse::new(board_stream(subscription)).keep_alive(KeepAlive::default())
}
