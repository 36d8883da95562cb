//! Lock → fetch → mutate → upload → unlock for one folder's metadata.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use vaultsync_core::error::E2eeError;
use vaultsync_core::events::{EventBus, MetadataEvent};
use vaultsync_core::traits::api::{DeleteResponse, E2eeApi};
use vaultsync_core::types::id::FolderId;
use vaultsync_core::types::lock::LockHandle;
use vaultsync_metadata::{FolderKey, FolderKeyProvider, FolderMetadata};

use crate::lease::LockLease;

/// The single choke point for metadata mutations of encrypted folders.
///
/// The coordinator keeps no per-sequence state: a sequence is owned by
/// whoever holds the [`LockHandle`], and the handle is consumed on release.
#[derive(Debug, Clone)]
pub struct MetadataCoordinator {
    /// Server endpoints.
    api: Arc<dyn E2eeApi>,
    /// Folder keys per encryption root.
    keys: Arc<dyn FolderKeyProvider>,
    /// Optional sink for progress events.
    events: Option<EventBus>,
}

impl MetadataCoordinator {
    /// Creates a new coordinator.
    pub fn new(api: Arc<dyn E2eeApi>, keys: Arc<dyn FolderKeyProvider>) -> Self {
        Self {
            api,
            keys,
            events: None,
        }
    }

    /// Publishes progress events on `bus`.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    fn publish(&self, event: MetadataEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    /// The folder key of the encryption root at `root_path`.
    pub fn folder_key(&self, root_path: &str) -> Result<FolderKey, E2eeError> {
        self.keys.folder_key(root_path)
    }

    /// Acquires the exclusive metadata lock on a folder.
    pub async fn acquire_lock(&self, folder_id: &FolderId) -> Result<LockHandle, E2eeError> {
        match self.api.lock_folder(folder_id).await {
            Ok(lock) => {
                info!(folder_id = %folder_id, "Encrypted folder locked");
                self.publish(MetadataEvent::FolderLocked {
                    folder_id: folder_id.clone(),
                });
                Ok(lock)
            }
            Err(e) => {
                warn!(folder_id = %folder_id, error = %e, "Failed to lock encrypted folder");
                Err(e)
            }
        }
    }

    /// Downloads, decrypts and validates the metadata of the locked folder.
    ///
    /// `root_path` names the encryption root whose folder key opens the document.
    pub async fn fetch_metadata(
        &self,
        lock: &LockHandle,
        root_path: &str,
    ) -> Result<FolderMetadata, E2eeError> {
        let folder_id = lock.folder_id();
        debug!(folder_id = %folder_id, root_path, "Fetching folder metadata");

        let raw = self.api.get_metadata(folder_id).await?;
        let key = self.folder_key(root_path)?;
        let document = FolderMetadata::parse(&raw, folder_id.clone(), root_path, &key)
            .map_err(|e| {
                error!(folder_id = %folder_id, error = %e, "Fetched metadata is invalid");
                E2eeError::from(e)
            })?;

        self.publish(MetadataEvent::MetadataFetched {
            folder_id: folder_id.clone(),
            entries: document.files().len(),
            pending_drop: document.file_drop().len(),
        });
        Ok(document)
    }

    /// Publishes `document` under `lock`, which the caller keeps holding.
    pub async fn upload_metadata(
        &self,
        lock: &LockHandle,
        document: &FolderMetadata,
    ) -> Result<(), E2eeError> {
        if document.folder_id() != lock.folder_id() {
            return Err(E2eeError::metadata_invalid(format!(
                "metadata of folder {} cannot be uploaded under the lock of folder {}",
                document.folder_id(),
                lock.folder_id()
            )));
        }

        let key = self.folder_key(document.root_path())?;
        let raw = document.to_wire(&key)?;

        self.api.put_metadata(lock, &raw).await.map_err(|e| {
            error!(folder_id = %lock.folder_id(), error = %e, "Metadata upload failed");
            e
        })?;

        info!(
            folder_id = %lock.folder_id(),
            deleted = document.is_deleted(),
            entries = document.files().len(),
            "Metadata uploaded"
        );
        self.publish(MetadataEvent::MetadataUploaded {
            folder_id: lock.folder_id().clone(),
            deleted: document.is_deleted(),
        });
        Ok(())
    }

    /// Publishes `document` and releases `lock`, reporting the upload result as
    /// the unlock's success flag. The upload error wins over an unlock error.
    pub async fn upload_and_release(
        &self,
        lock: LockHandle,
        document: &FolderMetadata,
    ) -> Result<(), E2eeError> {
        let uploaded = self.upload_metadata(&lock, document).await;
        let released = self.unlock_folder(lock, uploaded.is_ok()).await;
        uploaded.and(released)
    }

    /// Releases a lock. `success` tells the server whether the sequence completed.
    pub async fn unlock_folder(&self, lock: LockHandle, success: bool) -> Result<(), E2eeError> {
        let folder_id = lock.folder_id().clone();
        let result = self.api.unlock_folder(&lock, success).await;
        match &result {
            Ok(()) => info!(folder_id = %folder_id, success, "Encrypted folder unlocked"),
            Err(e) => {
                error!(folder_id = %folder_id, error = %e, "Failed to unlock encrypted folder")
            }
        }
        self.publish(MetadataEvent::FolderUnlocked { folder_id, success });
        result
    }

    /// Releases the lease if it owns its lock; adopted leases are left held.
    pub async fn release(&self, lease: LockLease<'_>, success: bool) -> Result<(), E2eeError> {
        match lease {
            LockLease::Acquired(lock) => self.unlock_folder(lock, success).await,
            LockLease::Adopted(lock) => {
                debug!(folder_id = %lock.folder_id(), "Lock adopted, leaving it held");
                Ok(())
            }
        }
    }

    /// Issues the WebDAV delete of `path` under `lock`, returning the raw answer.
    pub async fn delete_path(
        &self,
        path: &str,
        lock: &LockHandle,
    ) -> Result<DeleteResponse, E2eeError> {
        self.api.delete_path(path, lock).await
    }
}
