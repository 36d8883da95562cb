//! Local sync journal seam.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::record::JournalRecord;

/// The local database of synced items.
///
/// Only the delete propagator's success path removes records, and only
/// after the server confirmed the item is gone.
#[async_trait]
pub trait SyncJournal: Send + Sync + std::fmt::Debug + 'static {
    /// Look up the record for exactly `path`.
    async fn file_record(&self, path: &str) -> AppResult<Option<JournalRecord>>;

    /// Find the root of the encryption scope that owns `path`: the topmost
    /// encrypted directory among `path` and its ancestors.
    async fn root_e2e_folder_record(&self, path: &str) -> AppResult<Option<JournalRecord>>;

    /// The path the server knows `path` by: every segment recorded with a
    /// mangled name is replaced by it, the rest are kept as they are.
    async fn remote_path(&self, path: &str) -> AppResult<String>;

    /// Remove the record for `path` (and its subtree when `is_directory`).
    ///
    /// Returns `false` if nothing matched.
    async fn delete_file_record(&self, path: &str, is_directory: bool) -> AppResult<bool>;

    /// Make every pending change durable. `label` names the change set in logs.
    async fn commit(&self, label: &str) -> AppResult<()>;
}
