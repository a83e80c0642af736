//! Bulk create handler.
//!
//! Validates the entire batch before writing anything, assigns ids and a
//! shared creation timestamp, chunks into the store's batch-write ceiling,
//! issues all chunk writes concurrently, and aggregates store-reported
//! unprocessed items into a single partial-success outcome.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;
use ulid::Ulid;

use tasklane_storage::{DocumentStore, StorageError, TaskRecord, MAX_BATCH_PUT_ITEMS};

/// Maximum number of tasks accepted in one bulk request.
pub const MAX_BULK_TASKS: usize = 25;

/// A single task payload within a bulk request.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Request for bulk task creation.
#[derive(Debug, Clone)]
pub struct BulkCreateRequest {
    /// The tasks to create, in caller order.
    pub tasks: Vec<NewTask>,
}

/// A single field-level validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Path of the violating field, e.g. `tasks[2].title`.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    /// Creates a new violation.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a bulk create.
///
/// `tasks` always echoes every record the caller attempted to create, even
/// when some were unprocessed; callers cross-reference the counts to know
/// which subset landed.
#[derive(Debug, Clone)]
pub struct BulkCreateOutcome {
    pub tasks: Vec<TaskRecord>,
    pub created_count: u32,
    /// Set only on partial success: items durably written.
    pub processed_count: Option<u32>,
    /// Set only on partial success: items the store reported unprocessed.
    pub unprocessed_count: Option<u32>,
}

/// Errors that can occur during bulk creation.
#[derive(Debug, thiserror::Error)]
pub enum BulkCreateError {
    /// The request failed validation; nothing was written. Carries every
    /// violated field, not just the first.
    #[error("validation failed")]
    Invalid { errors: Vec<FieldViolation> },

    /// A chunk write failed outright.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for bulk create operations.
pub type BulkCreateResult<T> = Result<T, BulkCreateError>;

/// Handler for bulk task creation.
pub struct BulkCreateHandler<S: DocumentStore> {
    storage: Arc<S>,
}

impl<S: DocumentStore> BulkCreateHandler<S> {
    /// Creates a new bulk create handler.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Validates a bulk create request.
    ///
    /// All-or-nothing: any violation rejects the whole batch before a
    /// single write is issued.
    pub fn validate(&self, request: &BulkCreateRequest) -> BulkCreateResult<()> {
        let mut errors = Vec::new();

        if request.tasks.is_empty() {
            errors.push(FieldViolation::new("tasks", "At least one task is required"));
        }
        if request.tasks.len() > MAX_BULK_TASKS {
            errors.push(FieldViolation::new(
                "tasks",
                format!("Maximum {MAX_BULK_TASKS} tasks allowed per request"),
            ));
        }

        for (index, task) in request.tasks.iter().enumerate() {
            if task.title.is_empty() {
                errors.push(FieldViolation::new(
                    format!("tasks[{index}].title"),
                    "Title is required",
                ));
            }
            if task.description.is_empty() {
                errors.push(FieldViolation::new(
                    format!("tasks[{index}].description"),
                    "Description is required",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BulkCreateError::Invalid { errors })
        }
    }

    /// Executes a bulk create request.
    pub async fn create(&self, request: BulkCreateRequest) -> BulkCreateResult<BulkCreateOutcome> {
        self.validate(&request)?;

        // One creation timestamp for the whole batch.
        let created_at = Utc::now();
        let records: Vec<TaskRecord> = request
            .tasks
            .into_iter()
            .map(|task| TaskRecord {
                id: Ulid::new().to_string(),
                title: task.title,
                description: task.description,
                created_at,
                updated_at: None,
            })
            .collect();

        // Chunk to the store's batch-write ceiling, preserving order, and
        // issue every chunk concurrently. A hard failure in any chunk
        // fails the whole request; per-item unprocessed reports do not.
        let writes = records
            .chunks(MAX_BATCH_PUT_ITEMS)
            .map(|chunk| self.storage.batch_put_tasks(chunk.to_vec()));
        let results = join_all(writes).await;

        let mut unprocessed: Vec<TaskRecord> = Vec::new();
        for result in results {
            unprocessed.extend(result?.unprocessed);
        }

        let created_count = records.len() as u32;
        let (processed_count, unprocessed_count) = if unprocessed.is_empty() {
            (None, None)
        } else {
            let unprocessed_count = unprocessed.len() as u32;
            warn!(
                unprocessed = unprocessed_count,
                total = created_count,
                "store left items unprocessed in bulk create"
            );
            (Some(created_count - unprocessed_count), Some(unprocessed_count))
        };

        Ok(BulkCreateOutcome {
            tasks: records,
            created_count,
            processed_count,
            unprocessed_count,
        })
    }
}
