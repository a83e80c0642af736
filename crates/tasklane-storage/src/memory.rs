//! In-memory storage implementation for testing and local runs.
//!
//! Scan semantics mirror the managed document store the trait abstracts:
//! a scan examines at most `limit` records physically, applies the filter
//! to that physical page afterwards, and reports a continuation key iff
//! more physical data remains. Records are walked in ascending id order so
//! continuation keys stay valid across calls; callers must not rely on
//! that order, it is an implementation detail.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::instrument;

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    BatchPutResult, DocumentStore, ScanFilter, ScanKey, ScanOptions, ScanPage, TaskChanges,
    TaskRecord, MAX_BATCH_PUT_ITEMS,
};

/// In-memory implementation of DocumentStore.
///
/// # Performance Characteristics
///
/// - **Get / put / delete**: O(1) average (DashMap operations)
/// - **Scan / count**: O(N) where N is the collection size (snapshot + walk)
///
/// Uses DashMap for thread-safe concurrent access without a global lock.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    /// Collection name, surfaced in traces and operational errors.
    table: String,
    tasks: DashMap<String, TaskRecord>,
}

impl MemoryDocumentStore {
    /// Creates a new in-memory store for the given collection name.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            tasks: DashMap::new(),
        }
    }

    /// Creates a new in-memory store wrapped in Arc.
    pub fn new_shared(table: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(table))
    }

    /// Snapshot of the collection in ascending id order.
    fn snapshot(&self) -> Vec<TaskRecord> {
        let mut records: Vec<TaskRecord> = self.tasks.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_task(&self, id: &str) -> StorageResult<TaskRecord> {
        self.tasks
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StorageError::TaskNotFound {
                task_id: id.to_string(),
            })
    }

    #[instrument(skip(self, record), fields(table = %self.table, task_id = %record.id))]
    async fn put_task(&self, record: TaskRecord) -> StorageResult<()> {
        self.tasks.insert(record.id.clone(), record);
        Ok(())
    }

    #[instrument(skip(self, changes), fields(table = %self.table, task_id = %id))]
    async fn update_task(&self, id: &str, changes: TaskChanges) -> StorageResult<TaskRecord> {
        // Capture timestamp before acquiring the entry to minimize hold time
        let now = Utc::now();

        let mut entry = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| StorageError::TaskNotFound {
                task_id: id.to_string(),
            })?;

        if let Some(title) = changes.title {
            entry.title = title;
        }
        if let Some(description) = changes.description {
            entry.description = description;
        }
        entry.updated_at = Some(now);

        Ok(entry.clone())
    }

    #[instrument(skip(self), fields(table = %self.table, task_id = %id))]
    async fn delete_task(&self, id: &str) -> StorageResult<()> {
        if self.tasks.remove(id).is_none() {
            return Err(StorageError::TaskNotFound {
                task_id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn scan_tasks(
        &self,
        filter: &ScanFilter,
        options: &ScanOptions,
    ) -> StorageResult<ScanPage> {
        if options.limit == Some(0) {
            return Err(StorageError::InvalidRequest {
                message: "scan limit must be at least 1".to_string(),
            });
        }

        let snapshot = self.snapshot();

        // Exclusive start: resume after the last evaluated key. An id no
        // longer present still positions the scan by key order.
        let start = match &options.start_key {
            Some(key) => snapshot.partition_point(|r| r.id.as_str() <= key.id.as_str()),
            None => 0,
        };

        let remaining = snapshot.len() - start;
        let page_len = match options.limit {
            Some(limit) => remaining.min(limit as usize),
            None => remaining,
        };
        let physical = &snapshot[start..start + page_len];

        let last_evaluated_key = if start + page_len < snapshot.len() {
            physical.last().map(|r| ScanKey { id: r.id.clone() })
        } else {
            None
        };

        let items: Vec<TaskRecord> = physical
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        Ok(ScanPage {
            items,
            last_evaluated_key,
            scanned_count: page_len as u32,
        })
    }

    #[instrument(skip(self, records), fields(table = %self.table, batch_len = records.len()))]
    async fn batch_put_tasks(&self, records: Vec<TaskRecord>) -> StorageResult<BatchPutResult> {
        if records.is_empty() || records.len() > MAX_BATCH_PUT_ITEMS {
            return Err(StorageError::InvalidRequest {
                message: format!(
                    "batch put accepts 1 to {} items, got {}",
                    MAX_BATCH_PUT_ITEMS,
                    records.len()
                ),
            });
        }

        for record in records {
            self.tasks.insert(record.id.clone(), record);
        }

        // The in-memory backend never applies per-item admission control.
        Ok(BatchPutResult::default())
    }

    async fn count_tasks(&self, filter: &ScanFilter) -> StorageResult<u64> {
        Ok(self.tasks.iter().filter(|e| filter.matches(e.value())).count() as u64)
    }
}
