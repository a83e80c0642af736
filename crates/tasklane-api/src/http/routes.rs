//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;
use ulid::Ulid;

use tasklane_server::handlers::bulk::{
    BulkCreateError, BulkCreateRequest, FieldViolation, NewTask,
};
use tasklane_server::handlers::list::{ListTasksError, ListTasksParams};
use tasklane_storage::{DocumentStore, StorageError, TaskChanges, TaskRecord};

use super::state::AppState;
use crate::validation::{validate_create, validate_update};

/// Custom JSON extractor that returns 400 Bad Request instead of 422
/// Unprocessable Entity for deserialization errors.
///
/// Preserves 413 Payload Too Large for body limit errors.
pub struct JsonBadRequest<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBadRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBadRequest(value)),
            Err(rejection) => {
                use axum::extract::rejection::JsonRejection;

                // BytesRejection wraps body limit errors - keep 413 visible
                let status = match &rejection {
                    JsonRejection::BytesRejection(_)
                        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
                    {
                        StatusCode::PAYLOAD_TOO_LARGE
                    }
                    _ => StatusCode::BAD_REQUEST,
                };

                let message = rejection.body_text();
                let error = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::new(error_codes::PAYLOAD_TOO_LARGE, message)
                } else {
                    ApiError::validation_error(message)
                };

                Err((status, Json(error)))
            }
        }
    }
}

/// Default request body size limit (1MB).
/// This prevents memory exhaustion from oversized payloads.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Stable error code strings carried in every failure envelope.
pub mod error_codes {
    // 400 codes
    /// Malformed or constraint-violating input.
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Malformed pagination token.
    pub const INVALID_CURSOR: &str = "invalid_cursor";
    /// The store rejected the shape of the request.
    pub const STORE_REJECTED: &str = "store_rejected";

    // 404 codes
    /// Referenced task id is absent.
    pub const TASK_NOT_FOUND: &str = "task_not_found";

    // 413 codes
    /// Request body exceeds maximum allowed size.
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";

    // 5xx codes
    /// Unexpected internal server error.
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error response envelope.
///
/// Every failure carries a stable code and a human-readable message;
/// validation failures additionally carry per-field detail.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    /// Creates a validation error (400) carrying per-field detail.
    pub fn validation_failed(errors: Vec<FieldViolation>) -> Self {
        Self {
            code: error_codes::VALIDATION_ERROR.to_string(),
            message: "Validation failed".to_string(),
            errors: Some(errors),
        }
    }

    /// Creates an invalid continuation token error (400).
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_CURSOR, message)
    }

    /// Creates a store request-shape rejection error (400).
    pub fn store_rejected(message: impl Into<String>) -> Self {
        Self::new(error_codes::STORE_REJECTED, message)
    }

    /// Creates a task not found error (404).
    pub fn task_not_found() -> Self {
        Self::new(error_codes::TASK_NOT_FOUND, "Task not found")
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use error_codes::*;

        let status = match self.code.as_str() {
            // 404 Not Found
            TASK_NOT_FOUND => StatusCode::NOT_FOUND,

            // 400 Bad Request
            VALIDATION_ERROR | INVALID_CURSOR | STORE_REJECTED => StatusCode::BAD_REQUEST,

            // 413 Payload Too Large
            PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,

            // Default: 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            // 404 Not Found: the task doesn't exist
            StorageError::TaskNotFound { .. } => ApiError::task_not_found(),
            // 400 Bad Request: the store rejected the request shape
            StorageError::InvalidRequest { message } => ApiError::store_rejected(message),
            // 500: operational failures, message passed through
            _ => {
                error!("Storage error: {}", err);
                ApiError::internal_error(err.to_string())
            }
        }
    }
}

impl From<ListTasksError> for ApiError {
    fn from(err: ListTasksError) -> Self {
        match err {
            ListTasksError::InvalidCursor => ApiError::invalid_cursor("Invalid nextToken format"),
            ListTasksError::InvalidLimit { .. }
            | ListTasksError::InvalidSortField { .. }
            | ListTasksError::InvalidSortOrder { .. } => {
                ApiError::validation_error(err.to_string())
            }
            ListTasksError::Storage(storage) => storage.into(),
        }
    }
}

impl From<BulkCreateError> for ApiError {
    fn from(err: BulkCreateError) -> Self {
        match err {
            BulkCreateError::Invalid { errors } => ApiError::validation_failed(errors),
            BulkCreateError::Storage(storage) => storage.into(),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Private helper for the task routes.
fn api_routes<S: DocumentStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/tasks", post(create_task::<S>).get(list_tasks::<S>))
        .route("/tasks/bulk", post(bulk_create_tasks::<S>))
        .route(
            "/tasks/:id",
            get(get_task::<S>)
                .put(update_task::<S>)
                .delete(delete_task::<S>),
        )
}

/// Creates the HTTP router with all task endpoints.
///
/// Applies the default body size limit (1MB) to protect against oversized
/// payloads.
pub fn create_router<S: DocumentStore>(state: AppState<S>) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit<S: DocumentStore>(
    state: AppState<S>,
    body_limit: usize,
) -> Router {
    let shared_state = Arc::new(state);
    api_routes::<S>()
        // Liveness check
        .route("/health", get(health_check))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit))
}

/// Basic health check - returns 200 if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Wire types
// ============================================================

/// Task representation on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<TaskRecord> for TaskResponse {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Request body for creating a task.
///
/// Absent fields deserialize to empty strings so validation can report
/// them field by field instead of failing at the JSON layer.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Response for create.
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub message: String,
    pub task: TaskResponse,
}

/// Response for get.
#[derive(Debug, Serialize)]
pub struct GetTaskResponse {
    pub task: TaskResponse,
}

/// Request body for updating a task.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Response for update.
#[derive(Debug, Serialize)]
pub struct UpdateTaskResponse {
    pub message: String,
    pub task: TaskResponse,
}

/// Response for delete, echoing the pre-delete record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskResponse {
    pub message: String,
    pub deleted_task: TaskResponse,
}

/// Request body for bulk creation.
#[derive(Debug, Deserialize)]
pub struct BulkCreateTasksRequest {
    #[serde(default)]
    pub tasks: Vec<BulkTaskPayload>,
}

/// A single task payload within a bulk request.
#[derive(Debug, Deserialize)]
pub struct BulkTaskPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Response for bulk creation.
///
/// `processed_count`/`unprocessed_count` appear only on partial success;
/// `tasks` always echoes every attempted item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateTasksResponse {
    pub message: String,
    pub created_count: u32,
    pub tasks: Vec<TaskResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprocessed_count: Option<u32>,
}

/// Query parameters for listing tasks.
///
/// # Validation Rules
///
/// - `limit`: Optional string-encoded positive integer. Defaults to "10".
/// - `nextToken`: Optional opaque token from a previous response.
/// - `title`: Optional case-sensitive substring filter.
/// - `sortBy`: Optional task field name. Defaults to `createdAt`.
/// - `sortOrder`: Optional, `asc` or `desc`. Defaults to `desc`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

/// Pagination metadata for list responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub limit: u32,
    pub total_items: u64,
    pub has_next_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Response for listing tasks.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskResponse>,
    pub pagination: PaginationMeta,
    /// Items returned in this page after filtering.
    pub count: u32,
    /// Items physically examined for this page.
    pub scanned_count: u32,
}

// ============================================================
// Task handlers
// ============================================================

/// Guard for blank path ids. The router cannot match an absent segment,
/// but a blank or whitespace id still gets the explicit 400.
fn require_task_id(id: &str) -> ApiResult<()> {
    if id.trim().is_empty() {
        return Err(ApiError::validation_error("Task ID is required"));
    }
    Ok(())
}

async fn create_task<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let errors = validate_create(&body.title, &body.description);
    if !errors.is_empty() {
        return Err(ApiError::validation_failed(errors));
    }

    let record = TaskRecord {
        id: Ulid::new().to_string(),
        title: body.title,
        description: body.description,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.storage.put_task(record.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created".to_string(),
            task: record.into(),
        }),
    ))
}

async fn get_task<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require_task_id(&id)?;

    let task = state.storage.get_task(&id).await?;
    Ok(Json(GetTaskResponse { task: task.into() }))
}

async fn list_tasks<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .list_handler
        .list(ListTasksParams {
            limit: query.limit,
            next_token: query.next_token,
            title: query.title,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
        })
        .await?;

    Ok(Json(ListTasksResponse {
        tasks: page.tasks.into_iter().map(TaskResponse::from).collect(),
        pagination: PaginationMeta {
            limit: page.limit,
            total_items: page.total_items,
            has_next_page: page.has_next_page,
            next_token: page.next_token,
        },
        count: page.count,
        scanned_count: page.scanned_count,
    }))
}

async fn update_task<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBadRequest(body): JsonBadRequest<UpdateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    require_task_id(&id)?;

    let errors = validate_update(body.title.as_deref(), body.description.as_deref());
    if !errors.is_empty() {
        return Err(ApiError::validation_failed(errors));
    }

    // Existence check first; the get-then-update pair is two independent
    // calls with no isolation against a concurrent writer.
    state.storage.get_task(&id).await?;

    let task = state
        .storage
        .update_task(
            &id,
            TaskChanges {
                title: body.title,
                description: body.description,
            },
        )
        .await?;

    Ok(Json(UpdateTaskResponse {
        message: "Task updated successfully".to_string(),
        task: task.into(),
    }))
}

async fn delete_task<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require_task_id(&id)?;

    // Read first so the response can echo the record being removed.
    let deleted = state.storage.get_task(&id).await?;
    state.storage.delete_task(&id).await?;

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
        deleted_task: deleted.into(),
    }))
}

async fn bulk_create_tasks<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<BulkCreateTasksRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = BulkCreateRequest {
        tasks: body
            .tasks
            .into_iter()
            .map(|task| NewTask {
                title: task.title,
                description: task.description,
            })
            .collect(),
    };

    let outcome = state.bulk_handler.create(request).await?;

    let message = if outcome.unprocessed_count.is_some() {
        "Some tasks could not be processed"
    } else {
        "Tasks created successfully"
    };

    Ok((
        StatusCode::CREATED,
        Json(BulkCreateTasksResponse {
            message: message.to_string(),
            created_count: outcome.created_count,
            tasks: outcome.tasks.into_iter().map(TaskResponse::from).collect(),
            processed_count: outcome.processed_count,
            unprocessed_count: outcome.unprocessed_count,
        }),
    ))
}
