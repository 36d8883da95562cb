//! The exclusive right to mutate one folder's metadata document.

use super::id::{FolderId, LockToken};

/// A lock held on one encrypted folder, as `(folder id, token)`.
///
/// Created by a successful lock-acquire call. The handle is deliberately
/// not `Clone`: releasing it consumes it, so one acquired lock maps to at
/// most one unlock call. Nested operations borrow it instead of taking a
/// second lock.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a held folder lock must be released with unlock_folder"]
pub struct LockHandle {
    folder_id: FolderId,
    token: LockToken,
}

impl LockHandle {
    /// Wrap the token returned by the lock endpoint.
    pub fn new(folder_id: FolderId, token: LockToken) -> Self {
        Self { folder_id, token }
    }

    /// The locked folder.
    pub fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }

    /// The token the server expects on every mutation under this lock.
    pub fn token(&self) -> &LockToken {
        &self.token
    }
}
