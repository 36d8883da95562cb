//! In-process implementation of the encrypted-folder API.
//!
//! Holds folder metadata, lock tokens and the set of existing remote paths
//! behind a single mutex, counts every call, and can be told to misbehave.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use vaultsync_core::error::E2eeError;
use vaultsync_core::traits::api::{DeleteResponse, E2eeApi};
use vaultsync_core::types::id::{FolderId, LockToken};
use vaultsync_core::types::lock::LockHandle;
use vaultsync_core::types::record::normalize_path;

/// Number of calls per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub lock: usize,
    pub unlock: usize,
    pub get_metadata: usize,
    pub put_metadata: usize,
    pub delete: usize,
}

#[derive(Debug, Default)]
struct FolderState {
    metadata: Option<String>,
    lock: Option<LockToken>,
}

#[derive(Debug, Default)]
struct Faults {
    locked_elsewhere: HashSet<FolderId>,
    upload_status: Option<u16>,
    unlock_status: Option<u16>,
    delete_status: HashMap<String, u16>,
    delete_dropped: HashSet<String>,
    transport_down: bool,
}

#[derive(Debug, Default)]
struct ServerState {
    folders: HashMap<FolderId, FolderState>,
    paths: BTreeSet<String>,
    counts: CallCounts,
    unlocks: Vec<(FolderId, bool)>,
    faults: Faults,
    issued_tokens: u64,
}

impl ServerState {
    fn check_transport(&self) -> Result<(), E2eeError> {
        if self.faults.transport_down {
            Err(E2eeError::transport("connection refused"))
        } else {
            Ok(())
        }
    }

    fn holds(&self, lock: &LockHandle) -> bool {
        self.folders
            .get(lock.folder_id())
            .and_then(|folder| folder.lock.as_ref())
            .is_some_and(|token| token == lock.token())
    }

    fn holds_any(&self, lock: &LockHandle) -> bool {
        self.folders
            .values()
            .any(|folder| folder.lock.as_ref() == Some(lock.token()))
    }
}

/// A fake server for tests.
#[derive(Debug, Default)]
pub struct MemoryE2eeServer {
    state: Mutex<ServerState>,
}

impl MemoryE2eeServer {
    /// An empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an encrypted folder with an optional stored metadata document.
    pub async fn add_folder(&self, folder_id: impl Into<FolderId>, metadata: Option<String>) {
        let mut state = self.state.lock().await;
        state.folders.insert(
            folder_id.into(),
            FolderState {
                metadata,
                lock: None,
            },
        );
    }

    /// Make `path` exist remotely.
    pub async fn add_path(&self, path: &str) {
        self.state.lock().await.paths.insert(normalize_path(path));
    }

    /// Pretend another client holds the lock on `folder_id`.
    pub async fn lock_elsewhere(&self, folder_id: impl Into<FolderId>) {
        self.state
            .lock()
            .await
            .faults
            .locked_elsewhere
            .insert(folder_id.into());
    }

    /// Refuse every metadata upload with `status`.
    pub async fn reject_uploads(&self, status: u16) {
        self.state.lock().await.faults.upload_status = Some(status);
    }

    /// Refuse every unlock with `status`.
    pub async fn reject_unlocks(&self, status: u16) {
        self.state.lock().await.faults.unlock_status = Some(status);
    }

    /// Answer deletes of `path` with `status`, leaving the path in place.
    pub async fn answer_delete(&self, path: &str, status: u16) {
        self.state
            .lock()
            .await
            .faults
            .delete_status
            .insert(normalize_path(path), status);
    }

    /// Drop the connection on deletes of `path`; other calls still succeed.
    pub async fn drop_delete(&self, path: &str) {
        self.state
            .lock()
            .await
            .faults
            .delete_dropped
            .insert(normalize_path(path));
    }

    /// Fail every call with a transport error while `down` is set.
    pub async fn set_transport_down(&self, down: bool) {
        self.state.lock().await.faults.transport_down = down;
    }

    /// Calls made so far.
    pub async fn counts(&self) -> CallCounts {
        self.state.lock().await.counts
    }

    /// Every unlock call in order, with the success flag it carried.
    pub async fn unlocks(&self) -> Vec<(FolderId, bool)> {
        self.state.lock().await.unlocks.clone()
    }

    /// The stored metadata document of a folder.
    pub async fn stored_metadata(&self, folder_id: &FolderId) -> Option<String> {
        self.state
            .lock()
            .await
            .folders
            .get(folder_id)
            .and_then(|folder| folder.metadata.clone())
    }

    /// Whether any client currently holds the lock on `folder_id`.
    pub async fn is_locked(&self, folder_id: &FolderId) -> bool {
        self.state
            .lock()
            .await
            .folders
            .get(folder_id)
            .is_some_and(|folder| folder.lock.is_some())
    }

    /// Whether `path` exists remotely.
    pub async fn path_exists(&self, path: &str) -> bool {
        self.state.lock().await.paths.contains(&normalize_path(path))
    }
}

#[async_trait]
impl E2eeApi for MemoryE2eeServer {
    async fn lock_folder(&self, folder_id: &FolderId) -> Result<LockHandle, E2eeError> {
        let mut state = self.state.lock().await;
        state.counts.lock += 1;
        state.check_transport()?;

        if state.faults.locked_elsewhere.contains(folder_id) {
            return Err(E2eeError::LockUnavailable {
                folder_id: folder_id.to_string(),
            });
        }
        state.issued_tokens += 1;
        let token = LockToken::new(format!("token-{}", state.issued_tokens));

        let folder = state
            .folders
            .get_mut(folder_id)
            .ok_or_else(|| E2eeError::not_found(format!("folder {folder_id}")))?;
        if folder.lock.is_some() {
            return Err(E2eeError::LockUnavailable {
                folder_id: folder_id.to_string(),
            });
        }
        folder.lock = Some(token.clone());
        debug!(folder_id = %folder_id, token = %token, "Memory server granted lock");
        Ok(LockHandle::new(folder_id.clone(), token))
    }

    async fn unlock_folder(&self, lock: &LockHandle, success: bool) -> Result<(), E2eeError> {
        let mut state = self.state.lock().await;
        state.counts.unlock += 1;
        state.unlocks.push((lock.folder_id().clone(), success));
        state.check_transport()?;

        if let Some(status) = state.faults.unlock_status {
            return Err(E2eeError::UnlockRejected {
                folder_id: lock.folder_id().to_string(),
                status,
            });
        }
        if !state.holds(lock) {
            return Err(E2eeError::UnlockRejected {
                folder_id: lock.folder_id().to_string(),
                status: 403,
            });
        }
        if let Some(folder) = state.folders.get_mut(lock.folder_id()) {
            folder.lock = None;
        }
        Ok(())
    }

    async fn get_metadata(&self, folder_id: &FolderId) -> Result<String, E2eeError> {
        let mut state = self.state.lock().await;
        state.counts.get_metadata += 1;
        state.check_transport()?;

        state
            .folders
            .get(folder_id)
            .and_then(|folder| folder.metadata.clone())
            .ok_or_else(|| E2eeError::not_found(format!("metadata of folder {folder_id}")))
    }

    async fn put_metadata(&self, lock: &LockHandle, document: &str) -> Result<(), E2eeError> {
        let mut state = self.state.lock().await;
        state.counts.put_metadata += 1;
        state.check_transport()?;

        if let Some(status) = state.faults.upload_status {
            return Err(E2eeError::UploadRejected { status });
        }
        if !state.holds(lock) {
            return Err(E2eeError::UploadRejected { status: 403 });
        }
        if let Some(folder) = state.folders.get_mut(lock.folder_id()) {
            folder.metadata = Some(document.to_string());
        }
        Ok(())
    }

    async fn delete_path(
        &self,
        path: &str,
        lock: &LockHandle,
    ) -> Result<DeleteResponse, E2eeError> {
        let mut state = self.state.lock().await;
        state.counts.delete += 1;
        state.check_transport()?;

        let path = normalize_path(path);
        if state.faults.delete_dropped.contains(&path) {
            return Err(E2eeError::transport("connection reset by peer"));
        }
        if let Some(status) = state.faults.delete_status.get(&path) {
            return Ok(DeleteResponse { status: *status });
        }
        if !state.holds_any(lock) {
            return Ok(DeleteResponse { status: 403 });
        }
        if !state.paths.contains(&path) {
            return Ok(DeleteResponse {
                status: DeleteResponse::NOT_FOUND,
            });
        }

        let subtree = format!("{path}/");
        state
            .paths
            .retain(|existing| existing != &path && !existing.starts_with(&subtree));
        Ok(DeleteResponse {
            status: DeleteResponse::NO_CONTENT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let server = MemoryE2eeServer::new();
        server.add_folder("1", None).await;

        let lock = server.lock_folder(&FolderId::from("1")).await.unwrap();
        assert!(matches!(
            server.lock_folder(&FolderId::from("1")).await,
            Err(E2eeError::LockUnavailable { .. })
        ));

        server.unlock_folder(&lock, true).await.unwrap();
        assert!(!server.is_locked(&FolderId::from("1")).await);
        assert_eq!(server.unlocks().await, vec![(FolderId::from("1"), true)]);
    }

    #[tokio::test]
    async fn test_upload_requires_current_token() {
        let server = MemoryE2eeServer::new();
        server.add_folder("1", None).await;
        let stale = LockHandle::new(FolderId::from("1"), LockToken::from("old"));

        assert_eq!(
            server.put_metadata(&stale, "{}").await,
            Err(E2eeError::UploadRejected { status: 403 })
        );

        let lock = server.lock_folder(&FolderId::from("1")).await.unwrap();
        server.put_metadata(&lock, "{}").await.unwrap();
        assert_eq!(
            server.stored_metadata(&FolderId::from("1")).await.as_deref(),
            Some("{}")
        );
        server.unlock_folder(&lock, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_subtree() {
        let server = MemoryE2eeServer::new();
        server.add_folder("1", None).await;
        for path in ["shared", "shared/a", "shared/a/b.txt", "shared-old"] {
            server.add_path(path).await;
        }
        let lock = server.lock_folder(&FolderId::from("1")).await.unwrap();

        let response = server.delete_path("/shared/a", &lock).await.unwrap();
        assert_eq!(response.status, DeleteResponse::NO_CONTENT);
        assert!(!server.path_exists("shared/a/b.txt").await);
        assert!(server.path_exists("shared").await);

        let again = server.delete_path("shared/a", &lock).await.unwrap();
        assert_eq!(again.status, DeleteResponse::NOT_FOUND);
        server.unlock_folder(&lock, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_down() {
        let server = MemoryE2eeServer::new();
        server.add_folder("1", Some("{}".into())).await;
        server.set_transport_down(true).await;

        assert!(matches!(
            server.get_metadata(&FolderId::from("1")).await,
            Err(E2eeError::TransportFailure { .. })
        ));
        assert_eq!(server.counts().await.get_metadata, 1);
    }

    #[tokio::test]
    async fn test_dropped_delete_keeps_path() {
        let server = MemoryE2eeServer::new();
        server.add_folder("1", None).await;
        server.add_path("shared/a.txt").await;
        server.drop_delete("/shared/a.txt").await;
        let lock = server.lock_folder(&FolderId::from("1")).await.unwrap();

        assert!(matches!(
            server.delete_path("shared/a.txt", &lock).await,
            Err(E2eeError::TransportFailure { .. })
        ));
        assert!(server.path_exists("shared/a.txt").await);
        server.unlock_folder(&lock, true).await.unwrap();
    }
}
