//! Activity API integration tests

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{create_task, register_user, update_task, TestBoard, TestUser};

async fn activity(board: &TestBoard, user: &TestUser) -> Vec<Value> {
    let response = board
        .server
        .get("/api/activity")
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    response.json()
}

async fn unseen(board: &TestBoard, user: &TestUser) -> i64 {
    let response = board
        .server
        .get("/api/activity/unseen-count")
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    response.json::<Value>()["count"].as_i64().expect("count")
}

#[tokio::test]
async fn test_mutations_are_logged_and_classified() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let bob = register_user(&board.server, "bob").await;
    let task = create_task(&board.server, &alice, json!({"title": "Ship it"})).await;
    let id = task["id"].as_str().expect("task id").to_string();

    let moved = json!({"title": "Ship it", "status": "In Progress", "priority": "Medium"});
    update_task(&board.server, &alice, &id, 1, moved).await.assert_status_ok();

    let assigned = json!({
        "title": "Ship it",
        "status": "In Progress",
        "priority": "Medium",
        "assigned_user_id": bob.id,
    });
    update_task(&board.server, &alice, &id, 2, assigned).await.assert_status_ok();

    let reprioritized = json!({
        "title": "Ship it",
        "status": "In Progress",
        "priority": "High",
        "assigned_user_id": bob.id,
    });
    update_task(&board.server, &bob, &id, 3, reprioritized).await.assert_status_ok();

    let unassigned = json!({"title": "Ship it", "status": "In Progress", "priority": "High"});
    update_task(&board.server, &bob, &id, 4, unassigned).await.assert_status_ok();

    let entries = activity(&board, &alice).await;
    let actions: Vec<&str> = entries.iter().filter_map(|entry| entry["action"].as_str()).collect();
    assert_eq!(actions, vec!["unassign", "update", "assign", "drag_drop", "create"]);

    let drag = &entries[3];
    assert_eq!(drag["details"]["from_status"], "Todo");
    assert_eq!(drag["details"]["to_status"], "In Progress");
    assert_eq!(drag["username"], "alice");
    assert_eq!(drag["task_title"], "Ship it");
    assert_eq!(entries[2]["details"]["assigned_user_id"], bob.id.to_string());
    assert_eq!(entries[1]["username"], "bob");
}

#[tokio::test]
async fn test_activity_survives_task_deletion() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let task = create_task(&board.server, &alice, json!({"title": "Temporary"})).await;

    board
        .server
        .delete(&format!("/api/tasks/{}", task["id"].as_str().expect("task id")))
        .authorization_bearer(&alice.token)
        .await
        .assert_status_ok();

    let entries = activity(&board, &alice).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "delete");
    assert_eq!(entries[0]["details"]["title"], "Temporary");
    assert_eq!(entries[0]["task_id"], task["id"]);
    assert_eq!(entries[0]["task_title"], Value::Null);
}

#[tokio::test]
async fn test_activity_is_capped() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    for n in 0..25 {
        create_task(&board.server, &alice, json!({"title": format!("Task {}", n)})).await;
    }

    let entries = activity(&board, &alice).await;
    assert_eq!(entries.len(), 20);
    assert_eq!(entries[0]["details"]["title"], "Task 24");
}

#[tokio::test]
async fn test_unseen_count_and_mark_seen() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let bob = register_user(&board.server, "bob").await;

    create_task(&board.server, &alice, json!({"title": "One"})).await;
    create_task(&board.server, &alice, json!({"title": "Two"})).await;

    // own entries never count
    assert_eq!(unseen(&board, &alice).await, 0);
    assert_eq!(unseen(&board, &bob).await, 2);

    let response = board
        .server
        .post("/api/activity/mark-seen")
        .authorization_bearer(&bob.token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"success": true}));
    assert_eq!(unseen(&board, &bob).await, 0);

    create_task(&board.server, &alice, json!({"title": "Three"})).await;
    assert_eq!(unseen(&board, &bob).await, 1);
}
