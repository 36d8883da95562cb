//! SQLite connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use vaultsync_core::config::JournalConfig;
use vaultsync_core::error::{AppError, ErrorKind};

use crate::migration::run_migrations;

/// Wrapper around the sqlx SQLite connection pool.
#[derive(Debug, Clone)]
pub struct JournalPool {
    pool: SqlitePool,
}

impl JournalPool {
    /// Open the journal described by `config` and bring its schema up to date.
    pub async fn connect(config: &JournalConfig) -> Result<Self, AppError> {
        info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Opening sync journal"
        );

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid journal URL '{}': {e}", config.url),
                    e,
                )
            })?
            .create_if_missing(true);

        // An in-memory database exists per connection, so it must not be pooled wider.
        let max_connections = if is_memory_url(&config.url) {
            1
        } else {
            config.max_connections.max(1)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to open journal: {e}"),
                    e,
                )
            })?;

        run_migrations(&pool).await?;

        info!("Sync journal ready");
        Ok(Self { pool })
    }

    /// An in-memory journal, for tests and dry runs.
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect(&JournalConfig {
            url: "sqlite::memory:".to_string(),
            ..JournalConfig::default()
        })
        .await
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Sync journal closed");
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_memory_url() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://journal?mode=memory"));
        assert!(!is_memory_url("sqlite://data/journal.db?mode=rwc"));
    }

    #[tokio::test]
    async fn test_connect_file_journal() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("journal.db").display());
        let pool = JournalPool::connect(&JournalConfig {
            url,
            ..JournalConfig::default()
        })
        .await
        .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journal_records")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
        pool.close().await;
    }
}
