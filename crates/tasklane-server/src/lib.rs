//! tasklane-server: Request handlers and configuration
//!
//! This crate contains the business logic layer including:
//! - List handler for paginated, filtered, sorted task queries
//! - Bulk create handler with batching and partial-failure reporting
//! - Configuration management
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             tasklane-server                  │
//! ├─────────────────────────────────────────────┤
//! │  config.rs   - Configuration management     │
//! │  handlers/   - Request handlers             │
//! │    list.rs        - List/query tasks        │
//! │    bulk.rs        - Bulk task creation      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod handlers;

// Re-exports for convenience
pub use config::{ConfigLoadError, ServerConfig};
