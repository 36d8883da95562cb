//! SQLite-backed sync journal.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use vaultsync_core::error::{AppError, ErrorKind};
use vaultsync_core::result::AppResult;
use vaultsync_core::traits::journal::SyncJournal;
use vaultsync_core::types::record::{JournalRecord, ancestors_inclusive, normalize_path};

use crate::connection::JournalPool;
use crate::repositories::RecordRepository;

/// A record removal waiting for the next commit.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDelete {
    path: String,
    is_directory: bool,
}

/// The local sync journal.
///
/// Removals are staged by [`SyncJournal::delete_file_record`] and applied
/// atomically by [`SyncJournal::commit`].
#[derive(Debug)]
pub struct SqliteJournal {
    records: RecordRepository,
    pending: Mutex<Vec<PendingDelete>>,
}

impl SqliteJournal {
    /// Create a journal on top of an opened pool.
    pub fn new(pool: &JournalPool) -> Self {
        Self {
            records: RecordRepository::new(pool.pool().clone()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Insert or replace a record. The path is normalized first.
    pub async fn upsert_record(&self, mut record: JournalRecord) -> AppResult<()> {
        record.path = normalize_path(&record.path);
        if record.path.is_empty() {
            return Err(AppError::validation("Journal path must not be empty"));
        }
        self.records.upsert(&record).await
    }

    /// All records, or those under `path` when given.
    pub async fn list_records(&self, path: Option<&str>) -> AppResult<Vec<JournalRecord>> {
        let prefix = path.map(normalize_path);
        self.records.list(prefix.as_deref()).await
    }

    /// Number of staged removals not yet committed.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[async_trait]
impl SyncJournal for SqliteJournal {
    async fn file_record(&self, path: &str) -> AppResult<Option<JournalRecord>> {
        self.records.find_by_path(&normalize_path(path)).await
    }

    async fn root_e2e_folder_record(&self, path: &str) -> AppResult<Option<JournalRecord>> {
        for candidate in ancestors_inclusive(path) {
            if let Some(record) = self.records.find_by_path(&candidate).await? {
                if record.is_directory && record.is_e2e_encrypted {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    async fn remote_path(&self, path: &str) -> AppResult<String> {
        let mut segments = Vec::new();
        for candidate in ancestors_inclusive(path) {
            let name = candidate
                .rsplit_once('/')
                .map_or(candidate.as_str(), |(_, name)| name);
            let mangled = self
                .records
                .find_by_path(&candidate)
                .await?
                .and_then(|record| record.e2e_mangled_name);
            segments.push(mangled.unwrap_or_else(|| name.to_string()));
        }
        Ok(segments.join("/"))
    }

    async fn delete_file_record(&self, path: &str, is_directory: bool) -> AppResult<bool> {
        let path = normalize_path(path);
        if self.records.count_matching(&path, is_directory).await? == 0 {
            return Ok(false);
        }
        debug!(path = %path, is_directory, "Staged journal record removal");
        self.pending.lock().await.push(PendingDelete { path, is_directory });
        Ok(true)
    }

    async fn commit(&self, label: &str) -> AppResult<()> {
        let mut pending = self.pending.lock().await;
        if pending.is_empty() {
            return Ok(());
        }

        let mut tx = self.records.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin journal commit", e)
        })?;

        let mut removed = 0;
        for item in pending.iter() {
            removed +=
                RecordRepository::delete_with(&mut *tx, &item.path, item.is_directory).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit journal", e)
        })?;

        info!(label, removed, "Journal committed");
        pending.clear();
        Ok(())
    }
}
