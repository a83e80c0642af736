//! tasklane-api: HTTP surface for the task service
//!
//! This crate exposes the REST API (axum) over any
//! [`tasklane_storage::DocumentStore`] backend, plus the shared field
//! validation the handlers use.

pub mod http;
pub mod validation;
