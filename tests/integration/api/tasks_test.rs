//! Task API integration tests
//!
//! Covers creation, title rules, optimistic updates and conflicts, deletion
//! and smart assignment.

use std::future::IntoFuture;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{create_task, register_user, update_task, TestBoard};

fn fields(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": null,
        "status": status,
        "priority": "Medium",
        "assigned_user_id": null,
    })
}

fn task_id(task: &Value) -> String {
    task["id"].as_str().expect("task id").to_string()
}

#[tokio::test]
async fn test_create_task() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;

    let task = create_task(
        &board.server,
        &alice,
        json!({"title": "  Write docs  ", "description": "API section", "priority": "High"}),
    )
    .await;

    assert_eq!(task["title"], "Write docs");
    assert_eq!(task["status"], "Todo");
    assert_eq!(task["priority"], "High");
    assert_eq!(task["version"], 1);
    assert_eq!(task["created_by"], alice.id.to_string());
    assert_eq!(task["created_by_username"], "alice");
    assert_eq!(task["assigned_username"], Value::Null);
}

#[tokio::test]
async fn test_list_tasks_newest_first() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    create_task(&board.server, &alice, json!({"title": "First"})).await;
    create_task(&board.server, &alice, json!({"title": "Second"})).await;

    let response = board
        .server
        .get("/api/tasks")
        .authorization_bearer(&alice.token)
        .await;
    response.assert_status_ok();
    let tasks: Vec<Value> = response.json();
    let titles: Vec<&str> = tasks.iter().filter_map(|task| task["title"].as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_tasks_require_token() {
    let board = TestBoard::new();

    let response = board.server.get("/api/tasks").await;
    crate::assert_api_error!(response, StatusCode::UNAUTHORIZED, "Access token required");
}

#[tokio::test]
async fn test_create_rejects_bad_titles() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    create_task(&board.server, &alice, json!({"title": "Release"})).await;

    for (title, message) in [
        ("   ", "Task title is required"),
        ("in progress", "Task title cannot match column names"),
        (" DONE ", "Task title cannot match column names"),
        ("Release", "Task title must be unique"),
    ] {
        let response = board
            .server
            .post("/api/tasks")
            .authorization_bearer(&alice.token)
            .json(&json!({"title": title}))
            .await;
        crate::assert_api_error!(response, StatusCode::BAD_REQUEST, message);
    }
}

#[tokio::test]
async fn test_create_rejects_unknown_assignee() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;

    let response = board
        .server
        .post("/api/tasks")
        .authorization_bearer(&alice.token)
        .json(&json!({"title": "Orphan", "assigned_user_id": uuid::Uuid::new_v4()}))
        .await;
    crate::assert_api_error!(response, StatusCode::BAD_REQUEST, "Assigned user does not exist");
}

#[tokio::test]
async fn test_update_increments_version() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let task = create_task(&board.server, &alice, json!({"title": "Draft"})).await;
    let id = task_id(&task);

    let response = update_task(&board.server, &alice, &id, 1, fields("Draft v2", "In Progress")).await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["title"], "Draft v2");
    assert_eq!(updated["status"], "In Progress");
}

#[tokio::test]
async fn test_stale_version_gets_conflict() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let bob = register_user(&board.server, "bob").await;
    let task = create_task(&board.server, &alice, json!({"title": "Shared"})).await;
    let id = task_id(&task);

    // bring the task to version 3
    update_task(&board.server, &alice, &id, 1, fields("Shared", "Todo")).await.assert_status_ok();
    update_task(&board.server, &alice, &id, 2, fields("Shared", "Todo")).await.assert_status_ok();

    let winner = update_task(&board.server, &alice, &id, 3, fields("Alice's title", "Todo")).await;
    winner.assert_status_ok();
    assert_eq!(winner.json::<Value>()["version"], 4);

    let loser = update_task(&board.server, &bob, &id, 3, fields("Bob's title", "Done")).await;
    assert_eq!(loser.status_code(), StatusCode::CONFLICT);
    let report: Value = loser.json();
    assert_eq!(report["error"], "Conflict detected");
    assert_eq!(report["currentVersion"], 4);
    assert_eq!(report["currentTask"]["title"], "Alice's title");
    assert_eq!(report["currentTask"]["version"], 4);

    // resubmitting under the reported version succeeds
    let retry = update_task(&board.server, &bob, &id, 4, fields("Bob's title", "Done")).await;
    retry.assert_status_ok();
    let resolved: Value = retry.json();
    assert_eq!(resolved["version"], 5);
    assert_eq!(resolved["title"], "Bob's title");
}

#[tokio::test]
async fn test_title_rules_checked_before_version() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    create_task(&board.server, &alice, json!({"title": "Taken"})).await;
    let task = create_task(&board.server, &alice, json!({"title": "Mine"})).await;
    let id = task_id(&task);

    let label = update_task(&board.server, &alice, &id, 99, fields("todo", "Todo")).await;
    crate::assert_api_error!(label, StatusCode::BAD_REQUEST, "Task title cannot match column names");

    let duplicate = update_task(&board.server, &alice, &id, 99, fields("Taken", "Todo")).await;
    crate::assert_api_error!(duplicate, StatusCode::BAD_REQUEST, "Task title must be unique");

    // keeping its own title is not a duplicate
    let stale = update_task(&board.server, &alice, &id, 99, fields("Mine", "Done")).await;
    assert_eq!(stale.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_concurrent_updates_single_winner() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let bob = register_user(&board.server, "bob").await;
    let task = create_task(&board.server, &alice, json!({"title": "Race"})).await;
    let id = task_id(&task);
    let path = format!("/api/tasks/{}", id);

    let mut a_body = fields("Race A", "In Progress");
    a_body["version"] = json!(1);
    let mut b_body = fields("Race B", "Done");
    b_body["version"] = json!(1);

    let (a, b) = tokio::join!(
        board
            .server
            .put(&path)
            .authorization_bearer(&alice.token)
            .json(&a_body)
            .into_future(),
        board
            .server
            .put(&path)
            .authorization_bearer(&bob.token)
            .json(&b_body)
            .into_future(),
    );

    let mut statuses = vec![a.status_code(), b.status_code()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let (winner, loser) = if a.status_code() == StatusCode::OK { (a, b) } else { (b, a) };
    let winner: Value = winner.json();
    let report: Value = loser.json();
    assert_eq!(winner["version"], 2);
    assert_eq!(report["currentVersion"], 2);
    assert_eq!(report["currentTask"]["title"], winner["title"]);
}

#[tokio::test]
async fn test_update_missing_task() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;

    let response = update_task(
        &board.server,
        &alice,
        &uuid::Uuid::new_v4().to_string(),
        1,
        fields("Ghost", "Todo"),
    )
    .await;
    crate::assert_api_error!(response, StatusCode::NOT_FOUND, "Task not found");
}

#[tokio::test]
async fn test_delete_task() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let task = create_task(&board.server, &alice, json!({"title": "Short lived"})).await;
    let path = format!("/api/tasks/{}", task_id(&task));

    let response = board.server.delete(&path).authorization_bearer(&alice.token).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Task deleted successfully");

    let tasks: Vec<Value> = board
        .server
        .get("/api/tasks")
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert!(tasks.is_empty());

    let again = board.server.delete(&path).authorization_bearer(&alice.token).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);

    // the title is free again
    create_task(&board.server, &alice, json!({"title": "Short lived"})).await;
}

#[tokio::test]
async fn test_validate_title() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let task = create_task(&board.server, &alice, json!({"title": "Existing"})).await;

    let check = |body: Value| {
        board
            .server
            .post("/api/tasks/validate-title")
            .authorization_bearer(&alice.token)
            .json(&body)
    };

    let fresh: Value = check(json!({"title": "Brand new"})).await.json();
    assert_eq!(fresh, json!({"valid": true}));

    let taken: Value = check(json!({"title": "Existing"})).await.json();
    assert_eq!(taken, json!({"valid": false, "error": "Task title must be unique"}));

    let own: Value = check(json!({"title": "Existing", "excludeId": task["id"]})).await.json();
    assert_eq!(own["valid"], true);

    let label: Value = check(json!({"title": "Done"})).await.json();
    assert_eq!(label["valid"], false);
}

#[tokio::test]
async fn test_smart_assign_picks_least_loaded_user() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let bob = register_user(&board.server, "bob").await;
    let carol = register_user(&board.server, "carol").await;

    create_task(&board.server, &alice, json!({"title": "A1", "assigned_user_id": alice.id})).await;
    create_task(&board.server, &alice, json!({"title": "B1", "assigned_user_id": bob.id})).await;
    // finished work does not count
    create_task(
        &board.server,
        &alice,
        json!({"title": "C1", "assigned_user_id": carol.id, "status": "Done"}),
    )
    .await;
    let task = create_task(&board.server, &alice, json!({"title": "Next"})).await;

    let response = board
        .server
        .post(&format!("/api/tasks/smart-assign/{}", task_id(&task)))
        .authorization_bearer(&alice.token)
        .await;
    response.assert_status_ok();
    let assigned: Value = response.json();
    assert_eq!(assigned["assigned_user_id"], carol.id.to_string());
    assert_eq!(assigned["assigned_username"], "carol");
    assert_eq!(assigned["version"], 2);
}

#[tokio::test]
async fn test_smart_assign_checks_supplied_version() {
    let board = TestBoard::new();
    let alice = register_user(&board.server, "alice").await;
    let task = create_task(&board.server, &alice, json!({"title": "Versioned"})).await;
    let path = format!("/api/tasks/smart-assign/{}", task_id(&task));

    let stale = board
        .server
        .post(&path)
        .authorization_bearer(&alice.token)
        .add_query_param("version", 7)
        .await;
    assert_eq!(stale.status_code(), StatusCode::CONFLICT);
    assert_eq!(stale.json::<Value>()["currentVersion"], 1);

    let current = board
        .server
        .post(&path)
        .authorization_bearer(&alice.token)
        .add_query_param("version", 1)
        .await;
    current.assert_status_ok();
    assert_eq!(current.json::<Value>()["assigned_user_id"], alice.id.to_string());

    let missing = board
        .server
        .post(&format!("/api/tasks/smart-assign/{}", uuid::Uuid::new_v4()))
        .authorization_bearer(&alice.token)
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}
