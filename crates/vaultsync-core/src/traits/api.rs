//! Server boundary for encrypted-folder operations.

use async_trait::async_trait;

use crate::error::E2eeError;
use crate::types::id::FolderId;
use crate::types::lock::LockHandle;

/// Raw answer of the server to a WebDAV delete.
///
/// The status is handed back uninterpreted; deciding which statuses count
/// as success is the propagator's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResponse {
    /// HTTP status code.
    pub status: u16,
}

impl DeleteResponse {
    /// "204 No Content".
    pub const NO_CONTENT: u16 = 204;
    /// "404 Not Found".
    pub const NOT_FOUND: u16 = 404;
}

/// Lock, metadata and delete endpoints of the sync server.
///
/// Every method is one network round trip. Transport failures and
/// timeouts surface as [`E2eeError::TransportFailure`].
#[async_trait]
pub trait E2eeApi: Send + Sync + std::fmt::Debug + 'static {
    /// Acquire the exclusive metadata lock on a folder.
    async fn lock_folder(&self, folder_id: &FolderId) -> Result<LockHandle, E2eeError>;

    /// Release a lock. `success` tells the server whether the sequence completed.
    async fn unlock_folder(&self, lock: &LockHandle, success: bool) -> Result<(), E2eeError>;

    /// Download the raw metadata document of a folder.
    async fn get_metadata(&self, folder_id: &FolderId) -> Result<String, E2eeError>;

    /// Publish a new metadata document under the held lock.
    async fn put_metadata(&self, lock: &LockHandle, document: &str) -> Result<(), E2eeError>;

    /// Delete a remote path under the held lock.
    async fn delete_path(&self, path: &str, lock: &LockHandle)
    -> Result<DeleteResponse, E2eeError>;
}
