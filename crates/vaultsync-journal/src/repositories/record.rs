//! Journal record repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool};

use vaultsync_core::error::{AppError, ErrorKind};
use vaultsync_core::result::AppResult;
use vaultsync_core::types::id::FolderId;
use vaultsync_core::types::record::JournalRecord;

/// Row shape of `journal_records`.
#[derive(Debug, FromRow)]
struct RecordRow {
    path: String,
    is_directory: bool,
    is_e2e_encrypted: bool,
    e2e_mangled_name: Option<String>,
    folder_id: Option<String>,
    etag: Option<String>,
    modified_at: DateTime<Utc>,
}

impl From<RecordRow> for JournalRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            path: row.path,
            is_directory: row.is_directory,
            is_e2e_encrypted: row.is_e2e_encrypted,
            e2e_mangled_name: row.e2e_mangled_name,
            folder_id: row.folder_id.map(FolderId::from),
            etag: row.etag,
            modified_at: row.modified_at,
        }
    }
}

/// Matches `?1` itself, and when `?2` is true every path below it.
const SUBTREE_FILTER: &str =
    "path = ?1 OR (?2 AND path > ?1 || '/' AND path < ?1 || '0')";

/// Repository for journal record queries.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    /// Create a new record repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the record for an exact path.
    pub async fn find_by_path(&self, path: &str) -> AppResult<Option<JournalRecord>> {
        sqlx::query_as::<_, RecordRow>("SELECT * FROM journal_records WHERE path = ?1")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(JournalRecord::from))
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find record", e))
    }

    /// List records, optionally restricted to a subtree.
    pub async fn list(&self, under: Option<&str>) -> AppResult<Vec<JournalRecord>> {
        let rows = match under {
            Some(prefix) => {
                sqlx::query_as::<_, RecordRow>(&format!(
                    "SELECT * FROM journal_records WHERE {SUBTREE_FILTER} ORDER BY path ASC"
                ))
                .bind(prefix)
                .bind(true)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, RecordRow>("SELECT * FROM journal_records ORDER BY path ASC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list records", e))?;

        Ok(rows.into_iter().map(JournalRecord::from).collect())
    }

    /// Insert or replace a record.
    pub async fn upsert(&self, record: &JournalRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO journal_records \
             (path, is_directory, is_e2e_encrypted, e2e_mangled_name, \
              folder_id, etag, modified_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(path) DO UPDATE SET \
             is_directory = excluded.is_directory, \
             is_e2e_encrypted = excluded.is_e2e_encrypted, \
             e2e_mangled_name = excluded.e2e_mangled_name, \
             folder_id = excluded.folder_id, \
             etag = excluded.etag, \
             modified_at = excluded.modified_at",
        )
        .bind(&record.path)
        .bind(record.is_directory)
        .bind(record.is_e2e_encrypted)
        .bind(&record.e2e_mangled_name)
        .bind(record.folder_id.as_ref().map(|id| id.as_str()))
        .bind(&record.etag)
        .bind(record.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert record", e))?;
        Ok(())
    }

    /// Count the records a delete of `path` would remove.
    pub async fn count_matching(&self, path: &str, is_directory: bool) -> AppResult<i64> {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM journal_records WHERE {SUBTREE_FILTER}"
        ))
        .bind(path)
        .bind(is_directory)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count records", e))
    }

    /// Delete `path` (and its subtree for directories) using `executor`,
    /// which may be a transaction. Returns the number of removed rows.
    pub async fn delete_with<'e, E>(executor: E, path: &str, is_directory: bool) -> AppResult<u64>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(&format!("DELETE FROM journal_records WHERE {SUBTREE_FILTER}"))
            .bind(path)
            .bind(is_directory)
            .execute(executor)
            .await
            .map(|result| result.rows_affected())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete record", e))
    }

    /// The pool backing this repository.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
