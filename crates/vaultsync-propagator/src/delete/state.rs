//! States of one delete job.
//!
//! Each state carries exactly the data the next step needs, so a step that
//! has not happened yet (an upload before a fetch, a raw delete without a
//! lock) has nothing to act on.

use vaultsync_core::types::id::FolderId;
use vaultsync_metadata::FolderMetadata;

use super::DeleteItem;
use crate::lease::LockLease;

/// What kind of delete a job performs.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DeleteMode<'a> {
    /// The item is the root of an encryption scope.
    Root,
    /// The item lives inside a scope whose metadata stays untouched.
    Nested,
    /// The item is a scope root whose listed children go first.
    Tree { children: &'a [DeleteItem] },
}

#[derive(Debug)]
pub(crate) enum DeleteState<'a> {
    Start,
    AcquiringLock {
        folder_id: FolderId,
    },
    FetchingMetadata {
        lease: LockLease<'a>,
    },
    DeletingChildren {
        lease: LockLease<'a>,
        document: FolderMetadata,
    },
    MarkingDeleted {
        lease: LockLease<'a>,
        document: FolderMetadata,
    },
    Uploading {
        lease: LockLease<'a>,
        document: FolderMetadata,
    },
    RawDelete {
        lease: LockLease<'a>,
    },
    Unlocking {
        lease: LockLease<'a>,
    },
    Done,
}

impl DeleteState<'_> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AcquiringLock { .. } => "acquiring_lock",
            Self::FetchingMetadata { .. } => "fetching_metadata",
            Self::DeletingChildren { .. } => "deleting_children",
            Self::MarkingDeleted { .. } => "marking_deleted",
            Self::Uploading { .. } => "uploading",
            Self::RawDelete { .. } => "raw_delete",
            Self::Unlocking { .. } => "unlocking",
            Self::Done => "done",
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}
