//! Integration of pending file-drop entries.

use serde::Serialize;
use tracing::{info, warn};

use vaultsync_core::error::E2eeError;
use vaultsync_core::events::{EventBus, MetadataEvent};
use vaultsync_core::types::id::FolderId;
use vaultsync_core::types::lock::LockHandle;

use crate::coordinator::MetadataCoordinator;

/// Result of one migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub folder_id: FolderId,
    /// Entries moved from the file drop into the entry list.
    pub migrated: usize,
}

/// Moves share-link uploads of one folder into its entry list.
///
/// Runs lock → fetch → migrate → upload → unlock. When nothing is pending
/// the folder is unlocked without an upload.
#[derive(Debug, Clone)]
pub struct FileDropMigration {
    coordinator: MetadataCoordinator,
    events: Option<EventBus>,
}

impl FileDropMigration {
    pub fn new(coordinator: MetadataCoordinator) -> Self {
        Self {
            coordinator,
            events: None,
        }
    }

    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Migrates the file drop of `folder_id`, the encryption root at `root_path`.
    pub async fn run(
        &self,
        folder_id: &FolderId,
        root_path: &str,
    ) -> Result<MigrationReport, E2eeError> {
        let lock = self.coordinator.acquire_lock(folder_id).await?;

        let mut document = match self.coordinator.fetch_metadata(&lock, root_path).await {
            Ok(document) => document,
            Err(e) => return self.abort(lock, e).await,
        };

        if !document.is_file_drop_present() {
            info!(folder_id = %folder_id, "File drop is empty, nothing to migrate");
            self.coordinator.unlock_folder(lock, true).await?;
            return Ok(MigrationReport {
                folder_id: folder_id.clone(),
                migrated: 0,
            });
        }

        let key = match self.coordinator.folder_key(root_path) {
            Ok(key) => key,
            Err(e) => return self.abort(lock, e).await,
        };
        let migrated = match document.move_from_file_drop_to_files(&key) {
            Ok(migrated) => migrated,
            Err(e) => return self.abort(lock, e.into()).await,
        };

        self.coordinator.upload_and_release(lock, &document).await?;

        info!(folder_id = %folder_id, migrated, "File drop migrated");
        if let Some(bus) = &self.events {
            bus.publish(MetadataEvent::FileDropMigrated {
                folder_id: folder_id.clone(),
                migrated,
            });
        }
        Ok(MigrationReport {
            folder_id: folder_id.clone(),
            migrated,
        })
    }

    /// Releases `lock` with `success = false` and reports `error`.
    async fn abort(
        &self,
        lock: LockHandle,
        error: E2eeError,
    ) -> Result<MigrationReport, E2eeError> {
        warn!(folder_id = %lock.folder_id(), error = %error, "File drop migration failed");
        // Unlock failures are logged by the coordinator.
        let _ = self.coordinator.unlock_folder(lock, false).await;
        Err(error)
    }
}
