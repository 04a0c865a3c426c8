//! Event store database schema.
//!
//! The SQL lives in the workspace `migrations/` directory and is embedded at
//! compile time, so the API binary and `#[sqlx::test]` apply the same schema.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};

/// Embedded migrations for the `domain_events` table.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies any pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history
/// diverges from the embedded one.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
