//! HTTP surface of the casework assessment service.
//!
//! The binary in `main.rs` wires configuration, telemetry and PostgreSQL;
//! everything request-facing lives here so integration tests can drive the
//! same router with in-memory collaborators.

use axum::Router;

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;

use state::AppState;

/// All routes, without middleware or state.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(routes::health::router())
        .nest("/assessments", routes::assessments::router())
        .nest("/tasks/assessment", routes::tasks::router())
}
