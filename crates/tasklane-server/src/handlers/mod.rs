//! Request handlers for the non-trivial task operations.

pub mod bulk;
pub mod list;

pub use bulk::{
    BulkCreateError, BulkCreateHandler, BulkCreateOutcome, BulkCreateRequest, FieldViolation,
    NewTask,
};
pub use list::{ListTasksError, ListTasksHandler, ListTasksParams, TaskPage};
