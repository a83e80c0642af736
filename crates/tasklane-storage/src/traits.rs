//! DocumentStore trait definition and the types it exchanges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Per-call ceiling for [`DocumentStore::batch_put_tasks`].
///
/// Mirrors the batch-write limit of the backing store; callers with more
/// items must chunk before issuing batch writes.
pub const MAX_BATCH_PUT_ITEMS: usize = 25;

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// System-assigned opaque identifier. Never caller-supplied, never
    /// changes after creation.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Set once at creation, immutable thereafter.
    pub created_at: DateTime<Utc>,
    /// Set on every successful update, absent until the first one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Field-level update set for [`DocumentStore::update_task`].
///
/// Only present fields are merged into the stored record.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Filter for scanning tasks.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Case-sensitive substring match against the `title` field.
    pub title_contains: Option<String>,
}

impl ScanFilter {
    /// Whether a record passes the filter.
    pub fn matches(&self, record: &TaskRecord) -> bool {
        match &self.title_contains {
            Some(needle) => record.title.contains(needle.as_str()),
            None => true,
        }
    }
}

/// The store's native continuation cursor: the key of the last physically
/// examined item. Serialized as JSON when handed to callers as an opaque
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanKey {
    pub id: String,
}

/// Options for a single scan request.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Maximum number of items to examine physically. `None` scans to the
    /// end of the collection.
    pub limit: Option<u32>,
    /// Resume position from a previous page's `last_evaluated_key`.
    /// Exclusive: the scan starts after this key.
    pub start_key: Option<ScanKey>,
}

/// One physical page of scan results.
///
/// The filter is applied after the physical page is read, so `items` can
/// hold fewer than `limit` records even when more matches exist beyond
/// this page. `scanned_count` is the number of records physically
/// examined, which can exceed `items.len()` when the filter discards
/// records.
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub items: Vec<TaskRecord>,
    /// Present iff more physical data remains beyond this page.
    pub last_evaluated_key: Option<ScanKey>,
    pub scanned_count: u32,
}

/// Result of a batch put.
///
/// `unprocessed` holds records the store accepted the request for but did
/// not durably write (per-item admission control). Hard failures are
/// reported through `StorageError` instead.
#[derive(Debug, Clone, Default)]
pub struct BatchPutResult {
    pub unprocessed: Vec<TaskRecord>,
}

/// Abstract storage interface for task data.
///
/// Implementations must be thread-safe (Send + Sync) and support
/// async operations. Per-key operations are independently atomic; no
/// multi-key transaction is offered.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Gets a task by id.
    async fn get_task(&self, id: &str) -> StorageResult<TaskRecord>;

    /// Writes a task unconditionally (upsert).
    async fn put_task(&self, record: TaskRecord) -> StorageResult<()>;

    /// Merges the present fields of `changes` into the stored task,
    /// stamps `updated_at`, and returns the post-update record.
    async fn update_task(&self, id: &str, changes: TaskChanges) -> StorageResult<TaskRecord>;

    /// Deletes a task by id.
    async fn delete_task(&self, id: &str) -> StorageResult<()>;

    /// Reads one physical page of tasks matching the filter.
    ///
    /// See [`ScanPage`] for the filter-after-page semantics.
    async fn scan_tasks(&self, filter: &ScanFilter, options: &ScanOptions)
        -> StorageResult<ScanPage>;

    /// Writes up to [`MAX_BATCH_PUT_ITEMS`] tasks in one call.
    ///
    /// Calls with zero items or more than the ceiling are rejected with
    /// `StorageError::InvalidRequest`. Individually rejected items are
    /// reported back in the result rather than failing the call.
    async fn batch_put_tasks(&self, records: Vec<TaskRecord>) -> StorageResult<BatchPutResult>;

    /// Counts tasks matching the filter across the whole collection.
    async fn count_tasks(&self, filter: &ScanFilter) -> StorageResult<u64>;
}
