//! Journal schema migration runner.

use sqlx::SqlitePool;
use tracing::info;

use vaultsync_core::error::{AppError, ErrorKind};

/// Run all pending journal migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Running journal migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Journal migrations completed successfully");
    Ok(())
}
