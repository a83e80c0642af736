//! Application state for HTTP handlers.

use std::sync::Arc;

use tasklane_server::handlers::bulk::BulkCreateHandler;
use tasklane_server::handlers::list::ListTasksHandler;
use tasklane_storage::DocumentStore;

/// Application state shared across all HTTP handlers.
///
/// Holds the storage backend plus the two non-trivial request handlers.
/// The storage dependency is constructed by the caller and passed in;
/// nothing here is process-global.
///
/// # Type Parameters
///
/// * `S` - The storage backend implementing `DocumentStore`
#[derive(Clone)]
pub struct AppState<S: DocumentStore> {
    /// The storage backend.
    pub storage: Arc<S>,
    /// Handler for paginated, filtered, sorted list queries.
    pub list_handler: Arc<ListTasksHandler<S>>,
    /// Handler for bulk creation with batching and partial-failure
    /// aggregation.
    pub bulk_handler: Arc<BulkCreateHandler<S>>,
}

impl<S: DocumentStore> AppState<S> {
    /// Creates a new application state over the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        let list_handler = Arc::new(ListTasksHandler::new(Arc::clone(&storage)));
        let bulk_handler = Arc::new(BulkCreateHandler::new(Arc::clone(&storage)));

        Self {
            storage,
            list_handler,
            bulk_handler,
        }
    }
}
