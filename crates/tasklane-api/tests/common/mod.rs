//! Shared helpers for API integration tests.

#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use tower::ServiceExt;

use tasklane_api::http::{create_router, AppState};
use tasklane_storage::{DocumentStore, MemoryDocumentStore, TaskRecord};

/// Creates a router over the given shared in-memory store.
pub fn create_test_app(storage: &Arc<MemoryDocumentStore>) -> Router {
    create_router(AppState::new(Arc::clone(storage)))
}

/// Sends a request with an optional JSON body and returns status + parsed
/// response body.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, None).await
}

/// Seeds a task directly in storage with a deterministic creation time
/// (minute offsets keep sort assertions stable).
pub async fn seed_task(storage: &Arc<MemoryDocumentStore>, id: &str, title: &str, minute: u32) {
    storage
        .put_task(TaskRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("description for {id}"),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, minute, 0).unwrap(),
            updated_at: None,
        })
        .await
        .unwrap();
}
