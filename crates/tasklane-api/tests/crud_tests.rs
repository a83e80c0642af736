//! CRUD integration tests for the single-item task endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use tasklane_storage::MemoryDocumentStore;

use common::{create_test_app, delete, get, post_json, put_json};

#[tokio::test]
async fn create_then_get_round_trips() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, created) = post_json(
        create_test_app(&storage),
        "/tasks",
        json!({"title": "write report", "description": "quarterly numbers"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Task created");
    let id = created["task"]["id"].as_str().unwrap().to_string();

    let (status, fetched) = get(create_test_app(&storage), &format!("/tasks/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["task"]["id"], id.as_str());
    assert_eq!(fetched["task"]["title"], "write report");
    assert_eq!(fetched["task"]["description"], "quarterly numbers");
}

#[tokio::test]
async fn repeated_creates_assign_unique_ids() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let mut ids = std::collections::HashSet::new();
    for i in 0..10 {
        let (status, created) = post_json(
            create_test_app(&storage),
            "/tasks",
            json!({"title": format!("task {i}"), "description": "d"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(ids.insert(created["task"]["id"].as_str().unwrap().to_string()));
    }
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn create_with_empty_title_reports_field_error() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = post_json(
        create_test_app(&storage),
        "/tasks",
        json!({"title": "", "description": "x"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "title");
}

#[tokio::test]
async fn create_with_missing_fields_reports_both() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = post_json(create_test_app(&storage), "/tasks", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["title", "description"]);
}

#[tokio::test]
async fn get_absent_task_returns_404() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = get(create_test_app(&storage), "/tasks/123").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn update_merges_fields_and_stamps_updated_at() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (_, created) = post_json(
        create_test_app(&storage),
        "/tasks",
        json!({"title": "before", "description": "keep me"}),
    )
    .await;
    let id = created["task"]["id"].as_str().unwrap().to_string();
    assert!(created["task"].get("updatedAt").is_none());

    let (status, updated) = put_json(
        create_test_app(&storage),
        &format!("/tasks/{id}"),
        json!({"title": "after"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "Task updated successfully");
    assert_eq!(updated["task"]["title"], "after");
    assert_eq!(updated["task"]["description"], "keep me");
    assert!(updated["task"]["updatedAt"].is_string());
    assert_eq!(updated["task"]["createdAt"], created["task"]["createdAt"]);
}

#[tokio::test]
async fn update_with_no_fields_fails_before_any_store_call() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    // The id does not exist; validation must reject the empty update
    // before the existence check could produce a 404.
    let (status, body) = put_json(create_test_app(&storage), "/tasks/missing", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn update_absent_task_returns_404() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = put_json(
        create_test_app(&storage),
        "/tasks/missing",
        json!({"title": "new"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn update_with_empty_present_field_is_rejected() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = put_json(
        create_test_app(&storage),
        "/tasks/anything",
        json!({"title": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "title");
}

#[tokio::test]
async fn delete_echoes_the_removed_task_and_subsequent_get_is_404() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (_, created) = post_json(
        create_test_app(&storage),
        "/tasks",
        json!({"title": "short lived", "description": "gone soon"}),
    )
    .await;
    let id = created["task"]["id"].as_str().unwrap().to_string();

    let (status, deleted) = delete(create_test_app(&storage), &format!("/tasks/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Task deleted successfully");
    assert_eq!(deleted["deletedTask"], created["task"]);

    let (status, _) = get(create_test_app(&storage), &format!("/tasks/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_absent_task_returns_404() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = delete(create_test_app(&storage), "/tasks/123").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn blank_task_id_returns_400() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (status, body) = get(create_test_app(&storage), "/tasks/%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Task ID is required");
}

#[tokio::test]
async fn error_envelope_always_carries_a_code() {
    let storage = MemoryDocumentStore::new_shared("tasks");

    let (_, body) = get(create_test_app(&storage), "/tasks/123").await;
    assert_eq!(body["code"], "task_not_found");

    let (_, body) = post_json(create_test_app(&storage), "/tasks", json!({})).await;
    assert_eq!(body["code"], "validation_error");
}
