//! Metadata coordinator events.

use serde::{Deserialize, Serialize};

use crate::types::id::FolderId;

/// Steps of a lock → fetch → mutate → upload → unlock sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetadataEvent {
    /// A folder lock was acquired.
    FolderLocked {
        /// The locked folder.
        folder_id: FolderId,
    },
    /// A metadata document was downloaded and validated.
    MetadataFetched {
        /// The folder the document belongs to.
        folder_id: FolderId,
        /// Number of integrated entries.
        entries: usize,
        /// Number of entries waiting in the file drop.
        pending_drop: usize,
    },
    /// A new metadata document was published.
    MetadataUploaded {
        /// The folder the document belongs to.
        folder_id: FolderId,
        /// Whether the published document is flagged deleted.
        deleted: bool,
    },
    /// Pending file-drop entries were merged into the entry list.
    FileDropMigrated {
        /// The folder the document belongs to.
        folder_id: FolderId,
        /// Number of migrated entries.
        migrated: usize,
    },
    /// A folder lock was released.
    FolderUnlocked {
        /// The unlocked folder.
        folder_id: FolderId,
        /// The success flag passed to the server.
        success: bool,
    },
}
