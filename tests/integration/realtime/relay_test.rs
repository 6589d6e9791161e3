//! Board event stream and relay integration tests
//!
//! The SSE stream is read straight from the response body, so these tests
//! drive a second router over the same state with `oneshot`.

use std::time::Duration;

use axum::{
    body::{Body, BodyDataStream},
    http::{Request, StatusCode},
    Router,
};
use futures_util::StreamExt;
use serde_json::{json, Value};
use taskboard::shared::event::{BoardEnvelope, BoardEvent};
use tokio::time::timeout;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{client_id, register_user, TestBoard, TestUser};

const QUIET: Duration = Duration::from_millis(200);
const WAIT: Duration = Duration::from_secs(5);

/// Reads `event:`/`data:` frames off an SSE body
struct SseReader {
    body: BodyDataStream,
    buffer: String,
}

impl SseReader {
    async fn open(router: Router, query: &str) -> Self {
        let request = Request::builder()
            .uri(format!("/api/board/events?{}", query))
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        Self {
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    async fn subscribe(board: &TestBoard, user: &TestUser, tab: &str, board_name: Option<&str>) -> Self {
        let mut query = format!("client_id={}&token={}", tab, user.token);
        if let Some(name) = board_name {
            query.push_str(&format!("&board={}", name));
        }
        Self::open(board.router(), &query).await
    }

    /// Next `(event name, envelope)`; keep-alive comments are skipped
    async fn next(&mut self) -> Option<(String, BoardEnvelope)> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let mut name = String::new();
                let mut data = String::new();
                for line in frame.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        name = value.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim_start());
                    }
                }
                if !data.is_empty() {
                    return Some((name, serde_json::from_str(&data).unwrap()));
                }
                continue;
            }

            let chunk = self.body.next().await?.unwrap();
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    async fn expect(&mut self) -> (String, BoardEnvelope) {
        timeout(WAIT, self.next())
            .await
            .expect("timed out waiting for a board event")
            .expect("stream closed")
    }

    async fn expect_quiet(&mut self) {
        if let Ok(Some((name, _))) = timeout(QUIET, self.next()).await {
            panic!("unexpected board event: {}", name);
        }
    }
}

async fn create_from_tab(board: &TestBoard, user: &TestUser, tab: &'static str, title: &str) -> Value {
    let (header, value) = client_id(tab);
    let response = board
        .server
        .post("/api/tasks")
        .authorization_bearer(&user.token)
        .add_header(header, value)
        .json(&json!({"title": title}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_mutation_events_skip_originating_tab() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let bob = register_user(&board.server, "bob").await;

    let mut tab_a = SseReader::subscribe(&board, &alice, "tab-a", None).await;
    let mut tab_b = SseReader::subscribe(&board, &bob, "tab-b", None).await;

    let task = create_from_tab(&board, &alice, "tab-a", "From A").await;

    let (name, envelope) = tab_b.expect().await;
    assert_eq!(name, "task-created");
    assert_eq!(envelope.origin.as_deref(), Some("tab-a"));
    match envelope.event {
        BoardEvent::TaskCreated(view) => assert_eq!(view.task.id.to_string(), task["id"].as_str().unwrap()),
        other => panic!("expected task-created, got {:?}", other),
    }
    let (name, _) = tab_b.expect().await;
    assert_eq!(name, "activity-logged");

    tab_a.expect_quiet().await;

    create_from_tab(&board, &bob, "tab-b", "From B").await;
    let (name, envelope) = tab_a.expect().await;
    assert_eq!(name, "task-created");
    match envelope.event {
        BoardEvent::TaskCreated(view) => assert_eq!(view.task.title, "From B"),
        other => panic!("expected task-created, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_and_delete_events() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let task = create_from_tab(&board, &alice, "tab-a", "Watched").await;
    let id: Uuid = task["id"].as_str().unwrap().parse().unwrap();

    let mut watcher = SseReader::subscribe(&board, &alice, "watcher", None).await;

    let (header, value) = client_id("tab-a");
    board
        .server
        .put(&format!("/api/tasks/{}", id))
        .authorization_bearer(&alice.token)
        .add_header(header, value)
        .json(&json!({"title": "Watched", "status": "Done", "priority": "Low", "version": 1}))
        .await
        .assert_status_ok();

    let (name, envelope) = watcher.expect().await;
    assert_eq!(name, "task-updated");
    match envelope.event {
        BoardEvent::TaskUpdated(view) => assert_eq!(view.task.version, 2),
        other => panic!("expected task-updated, got {:?}", other),
    }
    let (_, envelope) = watcher.expect().await;
    match envelope.event {
        BoardEvent::ActivityLogged(view) => assert_eq!(view.entry.action.as_str(), "drag_drop"),
        other => panic!("expected activity-logged, got {:?}", other),
    }

    board
        .server
        .delete(&format!("/api/tasks/{}", id))
        .authorization_bearer(&alice.token)
        .await
        .assert_status_ok();
    let (_, envelope) = watcher.expect().await;
    assert_eq!(envelope.event, BoardEvent::TaskDeleted { id });
    // no X-Client-Id on the delete
    assert_eq!(envelope.origin, None);
}

#[tokio::test]
async fn test_relay_reaches_other_subscribers() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;

    let mut tab_a = SseReader::subscribe(&board, &alice, "tab-a", None).await;
    let mut tab_b = SseReader::subscribe(&board, &alice, "tab-b", None).await;

    let id = Uuid::new_v4();
    let response = board
        .server
        .post("/api/board/events")
        .authorization_bearer(&alice.token)
        .json(&json!({
            "client_id": "tab-a",
            "event": {"event": "task-deleted", "data": {"id": id}},
        }))
        .await;
    response.assert_status_ok();
    // the sender's own subscription is counted but skips the event
    assert_eq!(response.json::<Value>(), json!({"delivered": 2}));

    let (name, envelope) = tab_b.expect().await;
    assert_eq!(name, "task-deleted");
    assert_eq!(envelope.board, "board");
    assert_eq!(envelope.origin.as_deref(), Some("tab-a"));
    assert_eq!(envelope.event, BoardEvent::TaskDeleted { id });

    tab_a.expect_quiet().await;
}

#[tokio::test]
async fn test_boards_are_isolated() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;

    let mut sprint = SseReader::subscribe(&board, &alice, "tab-s", Some("sprint")).await;

    create_from_tab(&board, &alice, "tab-a", "Default board only").await;
    sprint.expect_quiet().await;

    let id = Uuid::new_v4();
    let response = board
        .server
        .post("/api/board/events")
        .authorization_bearer(&alice.token)
        .json(&json!({
            "client_id": "tab-a",
            "board": "sprint",
            "event": {"event": "task-deleted", "data": {"id": id}},
        }))
        .await;
    assert_eq!(response.json::<Value>()["delivered"], 1);

    let (_, envelope) = sprint.expect().await;
    assert_eq!(envelope.board, "sprint");
    assert_eq!(envelope.event, BoardEvent::TaskDeleted { id });
}

#[tokio::test]
async fn test_stream_requires_token() {
    let board = TestBoard::new();

    for uri in ["/api/board/events?client_id=tab", "/api/board/events?client_id=tab&token=garbage"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = board.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_relay_requires_client_id() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;

    let response = board
        .server
        .post("/api/board/events")
        .authorization_bearer(&alice.token)
        .json(&json!({
            "client_id": " ",
            "event": {"event": "task-deleted", "data": {"id": Uuid::new_v4()}},
        }))
        .await;
    crate::assert_api_error!(response, StatusCode::BAD_REQUEST, "client_id is required");
}
