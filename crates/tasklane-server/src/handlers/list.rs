//! List/query handler.
//!
//! Turns raw query parameters into a single scan request, re-sorts the
//! returned page in memory (the store's scan guarantees no order), encodes
//! and decodes the opaque continuation token, and issues a separate
//! scan-for-count with the same filter.
//!
//! # Consistency
//!
//! The page scan and the count scan are two independent store calls with
//! no shared snapshot, so `total_items` is approximate under concurrent
//! writers. The filter is applied by the store after the physical page is
//! read, so a page can return fewer than `limit` matches while
//! `has_next_page` is still true.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use tasklane_storage::{
    DocumentStore, ScanFilter, ScanKey, ScanOptions, StorageError, TaskRecord,
};

/// Page size applied when the request carries no `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Raw query parameters for a list request, as received from the query
/// string. All fields are optional; defaults and validation are applied by
/// the handler.
#[derive(Debug, Clone, Default)]
pub struct ListTasksParams {
    /// String-encoded page size. Defaults to `"10"`.
    pub limit: Option<String>,
    /// Opaque continuation token from a previous page.
    pub next_token: Option<String>,
    /// Case-sensitive substring filter on the title field.
    pub title: Option<String>,
    /// Field to sort by. Defaults to `createdAt`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`. Defaults to `desc`.
    pub sort_order: Option<String>,
}

/// Task field a page can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    Id,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone)]
pub struct TaskPage {
    /// The current page, sorted.
    pub tasks: Vec<TaskRecord>,
    /// The page size that was requested.
    pub limit: u32,
    /// Total items matching the filter (approximate under concurrent
    /// mutation; computed by an independent count scan).
    pub total_items: u64,
    /// True iff the store returned a continuation key.
    pub has_next_page: bool,
    /// Opaque token for the next physical page, absent on the last page.
    pub next_token: Option<String>,
    /// Items actually returned after filtering.
    pub count: u32,
    /// Items physically examined for this page.
    pub scanned_count: u32,
}

/// Errors that can occur while listing tasks.
#[derive(Debug, thiserror::Error)]
pub enum ListTasksError {
    /// The `limit` parameter is not a positive integer.
    #[error("invalid limit: {message}")]
    InvalidLimit { message: String },

    /// The continuation token is not a URL-encoded scan key.
    #[error("Invalid nextToken format")]
    InvalidCursor,

    /// The `sortBy` parameter names no task field.
    #[error("unknown sort field: {field}")]
    InvalidSortField { field: String },

    /// The `sortOrder` parameter is neither `asc` nor `desc`.
    #[error("invalid sort order: {order}")]
    InvalidSortOrder { order: String },

    /// Storage error during the page or count scan.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for list operations.
pub type ListTasksResult<T> = Result<T, ListTasksError>;

/// Handler for paginated, filtered, sorted task queries.
pub struct ListTasksHandler<S: DocumentStore> {
    storage: Arc<S>,
}

impl<S: DocumentStore> ListTasksHandler<S> {
    /// Creates a new list handler.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Executes a list request.
    pub async fn list(&self, params: ListTasksParams) -> ListTasksResult<TaskPage> {
        let limit = parse_limit(params.limit.as_deref())?;
        let sort_by = parse_sort_field(params.sort_by.as_deref())?;
        let sort_order = parse_sort_order(params.sort_order.as_deref())?;

        // Decode the cursor before touching the store; a malformed token
        // must fail without a scan.
        let start_key = match params.next_token.as_deref() {
            Some(token) => Some(decode_cursor(token)?),
            None => None,
        };

        let filter = ScanFilter {
            title_contains: params.title,
        };

        let page = self
            .storage
            .scan_tasks(
                &filter,
                &ScanOptions {
                    limit: Some(limit),
                    start_key,
                },
            )
            .await?;

        let mut tasks = page.items;
        tasks.sort_by(|a, b| compare_tasks(a, b, sort_by, sort_order));

        // Independent count scan with the same filter; shares no
        // pagination state with the page scan.
        let total_items = self.storage.count_tasks(&filter).await?;

        let next_token = match page.last_evaluated_key.as_ref() {
            Some(key) => Some(encode_cursor(key)?),
            None => None,
        };

        let count = tasks.len() as u32;
        debug!(
            count,
            scanned = page.scanned_count,
            total = total_items,
            has_next = next_token.is_some(),
            "listed tasks"
        );

        Ok(TaskPage {
            tasks,
            limit,
            total_items,
            has_next_page: next_token.is_some(),
            next_token,
            count,
            scanned_count: page.scanned_count,
        })
    }
}

fn parse_limit(raw: Option<&str>) -> ListTasksResult<u32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PAGE_SIZE);
    };
    match raw.parse::<u32>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ListTasksError::InvalidLimit {
            message: format!("limit must be a positive integer, got '{raw}'"),
        }),
    }
}

fn parse_sort_field(raw: Option<&str>) -> ListTasksResult<SortField> {
    let raw = raw.unwrap_or("createdAt");
    SortField::from_name(raw).ok_or_else(|| ListTasksError::InvalidSortField {
        field: raw.to_string(),
    })
}

fn parse_sort_order(raw: Option<&str>) -> ListTasksResult<SortOrder> {
    let raw = raw.unwrap_or("desc");
    SortOrder::from_name(raw).ok_or_else(|| ListTasksError::InvalidSortOrder {
        order: raw.to_string(),
    })
}

/// Decodes an opaque continuation token back into the store's scan key.
fn decode_cursor(token: &str) -> ListTasksResult<ScanKey> {
    let decoded = urlencoding::decode(token).map_err(|_| ListTasksError::InvalidCursor)?;
    serde_json::from_str(&decoded).map_err(|_| ListTasksError::InvalidCursor)
}

/// Encodes a scan key as an opaque URL-encoded JSON token.
fn encode_cursor(key: &ScanKey) -> ListTasksResult<String> {
    let json = serde_json::to_string(key).map_err(|e| {
        ListTasksError::Storage(StorageError::InternalError {
            message: format!("failed to encode continuation token: {e}"),
        })
    })?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Explicit comparator for the in-memory page sort.
///
/// Missing values sort last regardless of direction; ties fall back to id
/// ascending so repeated requests order identically.
fn compare_tasks(a: &TaskRecord, b: &TaskRecord, field: SortField, order: SortOrder) -> Ordering {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    let primary = match field {
        SortField::Id => directed(a.id.cmp(&b.id)),
        SortField::Title => directed(a.title.cmp(&b.title)),
        SortField::Description => directed(a.description.cmp(&b.description)),
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
        SortField::UpdatedAt => match (a.updated_at, b.updated_at) {
            (Some(left), Some(right)) => directed(left.cmp(&right)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };

    primary.then_with(|| a.id.cmp(&b.id))
}
