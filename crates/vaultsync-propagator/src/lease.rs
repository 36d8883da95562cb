//! Owned versus borrowed folder locks.

use vaultsync_core::types::lock::LockHandle;

/// The lock a job works under.
///
/// Only an `Acquired` lease releases the lock; an `Adopted` one borrows a
/// handle owned by an enclosing operation and leaves it held.
#[derive(Debug)]
pub enum LockLease<'a> {
    /// Acquired by this job, which must release it.
    Acquired(LockHandle),
    /// Held by an enclosing operation.
    Adopted(&'a LockHandle),
}

impl LockLease<'_> {
    /// The underlying handle.
    pub fn handle(&self) -> &LockHandle {
        match self {
            Self::Acquired(handle) => handle,
            Self::Adopted(handle) => handle,
        }
    }

    /// Whether this lease is responsible for the unlock call.
    pub fn owns_release(&self) -> bool {
        matches!(self, Self::Acquired(_))
    }
}

#[cfg(test)]
mod tests {
    use vaultsync_core::types::id::{FolderId, LockToken};

    use super::*;

    #[test]
    fn test_only_acquired_owns_release() {
        let handle = LockHandle::new(FolderId::from("1"), LockToken::from("t"));
        let adopted = LockLease::Adopted(&handle);
        assert!(!adopted.owns_release());
        assert_eq!(adopted.handle().token().as_str(), "t");

        let handle = LockHandle::new(FolderId::from("1"), LockToken::from("u"));
        let acquired = LockLease::Acquired(handle);
        assert!(acquired.owns_release());
    }
}
