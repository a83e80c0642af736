//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Task not found.
    #[error("task not found: {task_id}")]
    TaskNotFound { task_id: String },

    /// The store rejected the shape of the request (e.g. batch size over
    /// the per-call ceiling). Maps to a 400-class response at the API.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Backend connection error.
    #[error("storage connection error: {message}")]
    ConnectionError { message: String },

    /// Backend query error.
    #[error("storage query error: {message}")]
    QueryError { message: String },

    /// Internal error.
    #[error("internal storage error: {message}")]
    InternalError { message: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
