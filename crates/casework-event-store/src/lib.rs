//! PostgreSQL event store for casework aggregates.

pub mod pg_event_repository;
pub mod schema;
