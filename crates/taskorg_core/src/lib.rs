//! Core domain logic for the task-organization backend.
//! This crate is the single source of truth for business invariants.
//!
//! The crate is a render-agnostic data layer: routing, access guarding,
//! validation, querying and persistence live here. HTML rendering, session
//! handling and the admin surface are external collaborators.

pub mod controller;
pub mod dashboard;
pub mod db;
pub mod dispatch;
pub mod guard;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod routes;
pub mod schema;

pub use controller::{Controller, ControllerError, FormOutcome, ListData, Redirect};
pub use dashboard::{DashboardCounts, EntityCounts};
pub use dispatch::{dispatch, DispatchError, Payload, Request};
pub use guard::{Identity, RequestContext};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entities::{
    Category, College, EntityId, Note, Priority, Program, Status, SubTask, Task,
};
pub use model::form::{FieldError, FormData, ValidationError};
pub use query::{ListParams, Page, PAGE_SIZE};
pub use repo::store::SqliteStore;
pub use repo::{RepoError, RepoResult};
pub use routes::{Action, Method, RouteMatch};
pub use schema::{EntityKind, EntitySchema};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
