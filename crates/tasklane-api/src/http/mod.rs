//! HTTP REST API endpoints.
//!
//! Implements the task API using Axum.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/tasks` | POST | Create a task |
//! | `/tasks` | GET | List tasks (pagination/filter/sort) |
//! | `/tasks/bulk` | POST | Bulk create tasks |
//! | `/tasks/{id}` | GET | Get a task |
//! | `/tasks/{id}` | PUT | Update a task |
//! | `/tasks/{id}` | DELETE | Delete a task |
//! | `/health` | GET | Liveness check |

pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_body_limit, ApiError, DEFAULT_BODY_LIMIT};
pub use state::AppState;
