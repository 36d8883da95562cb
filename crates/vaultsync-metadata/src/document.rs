//! The folder metadata document.

use std::collections::BTreeMap;

use vaultsync_core::types::id::{EntryId, FolderId};

use crate::entry::{DropEntry, FileEntry};
use crate::error::MetadataError;

/// Oldest document format version this client parses.
pub const MIN_SUPPORTED_VERSION: u32 = 1;
/// Version written by this client.
pub const METADATA_VERSION: u32 = 2;

/// Decrypted view of one encrypted folder's metadata.
///
/// An instance exists between a successful fetch and the matching upload
/// (or discard); it is owned by exactly one coordinator sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderMetadata {
    folder_id: FolderId,
    root_path: String,
    version: u32,
    deleted: bool,
    files: BTreeMap<EntryId, FileEntry>,
    file_drop: BTreeMap<EntryId, DropEntry>,
}

impl FolderMetadata {
    /// An empty, current-version document.
    pub fn new(folder_id: FolderId, root_path: impl Into<String>) -> Self {
        Self {
            folder_id,
            root_path: root_path.into(),
            version: METADATA_VERSION,
            deleted: false,
            files: BTreeMap::new(),
            file_drop: BTreeMap::new(),
        }
    }

    /// Assemble a document from parsed parts, enforcing the cross-map invariant.
    pub(crate) fn from_parts(
        folder_id: FolderId,
        root_path: String,
        version: u32,
        deleted: bool,
        files: BTreeMap<EntryId, FileEntry>,
        file_drop: BTreeMap<EntryId, DropEntry>,
    ) -> Result<Self, MetadataError> {
        if !(MIN_SUPPORTED_VERSION..=METADATA_VERSION).contains(&version) {
            return Err(MetadataError::UnsupportedVersion(version));
        }
        if let Some(id) = file_drop.keys().find(|id| files.contains_key(*id)) {
            return Err(MetadataError::DuplicateEntry(id.clone()));
        }
        Ok(Self {
            folder_id,
            root_path,
            version,
            deleted,
            files,
            file_drop,
        })
    }

    pub fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }

    /// Server path of the encryption root this document belongs to.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Integrated entries, ordered by identifier.
    pub fn files(&self) -> &BTreeMap<EntryId, FileEntry> {
        &self.files
    }

    /// Entries waiting in the file drop.
    pub fn file_drop(&self) -> &BTreeMap<EntryId, DropEntry> {
        &self.file_drop
    }

    pub fn file(&self, id: &EntryId) -> Option<&FileEntry> {
        self.files.get(id)
    }

    /// Whether the document still needs a file-drop migration.
    pub fn is_file_drop_present(&self) -> bool {
        !self.file_drop.is_empty()
    }

    /// Mark the whole folder for removal. Terminal: no entries may be added afterwards.
    pub fn flag_deleted_set(&mut self) {
        self.deleted = true;
    }

    /// Add an integrated entry under a fresh identifier.
    pub fn add_file(&mut self, entry: FileEntry) -> Result<EntryId, MetadataError> {
        if self.deleted {
            return Err(MetadataError::Deleted);
        }
        let id = self.fresh_id();
        self.files.insert(id.clone(), entry);
        Ok(id)
    }

    /// Remove an integrated entry.
    pub fn remove_file(&mut self, id: &EntryId) -> Option<FileEntry> {
        self.files.remove(id)
    }

    /// Add a sealed file-drop entry, as a share-link uploader would.
    pub fn add_dropped(&mut self, entry: DropEntry) -> Result<EntryId, MetadataError> {
        if self.deleted {
            return Err(MetadataError::Deleted);
        }
        let id = self.fresh_id();
        self.file_drop.insert(id.clone(), entry);
        Ok(id)
    }

    /// An identifier used by neither map.
    pub(crate) fn fresh_id(&self) -> EntryId {
        loop {
            let id = EntryId::generate();
            if !self.files.contains_key(&id) && !self.file_drop.contains_key(&id) {
                return id;
            }
        }
    }

    /// Move the drop area out, leaving it empty.
    pub(crate) fn take_file_drop(&mut self) -> BTreeMap<EntryId, DropEntry> {
        std::mem::take(&mut self.file_drop)
    }

    pub(crate) fn insert_file_unchecked(&mut self, id: EntryId, entry: FileEntry) {
        self.files.insert(id, entry);
    }
}
