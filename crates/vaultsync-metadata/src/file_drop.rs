//! Integration of file-drop entries into the entry list.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::crypto::FolderKey;
use crate::document::FolderMetadata;
use crate::entry::FileEntry;
use crate::error::MetadataError;

impl FolderMetadata {
    /// Decrypt every pending file-drop entry with the folder key, re-wrap its
    /// content key, and insert it into the entry list under a fresh id.
    ///
    /// All-or-nothing: if any drop entry fails to decrypt, the document is
    /// left untouched. A no-op returning `Ok(0)` when nothing is pending.
    pub fn move_from_file_drop_to_files(
        &mut self,
        folder_key: &FolderKey,
    ) -> Result<usize, MetadataError> {
        if !self.is_file_drop_present() {
            return Ok(0);
        }
        if self.is_deleted() {
            return Err(MetadataError::Deleted);
        }

        let mut migrated = Vec::with_capacity(self.file_drop().len());
        for (id, dropped) in self.file_drop() {
            let crypto_err = |source| MetadataError::Crypto {
                entry: id.clone(),
                source,
            };
            let file = dropped.open(folder_key).map_err(crypto_err)?;
            let file_key = STANDARD
                .decode(&file.key)
                .map_err(|e| crypto_err(e.into()))?;
            let entry = FileEntry::new(
                folder_key,
                file.encrypted_name,
                file.original_name,
                file.mime_type,
                file.size,
                file.initialization_vector,
                file.authentication_tag,
                &file_key,
            )
            .map_err(crypto_err)?;
            migrated.push(entry);
        }

        let count = migrated.len();
        self.take_file_drop();
        for entry in migrated {
            let id = self.fresh_id();
            debug!(entry_id = %id, name = %entry.encrypted_name, "Migrated file-drop entry");
            self.insert_file_unchecked(id, entry);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use vaultsync_core::types::id::FolderId;

    use super::*;
    use crate::entry::{DropEntry, DroppedFile};

    fn dropped(name: &str) -> DroppedFile {
        DroppedFile {
            encrypted_name: format!("enc-{name}"),
            original_name: name.to_string(),
            mime_type: "application/octet-stream".into(),
            size: 10,
            key: STANDARD.encode([9u8; 16]),
            initialization_vector: "aXY=".into(),
            authentication_tag: "dGFn".into(),
        }
    }

    #[test]
    fn test_migrates_all_pending_entries() {
        let key = FolderKey::generate();
        let mut doc = FolderMetadata::new(FolderId::from("5"), "shared");
        let existing =
            FileEntry::new(&key, "x", "existing.txt", "text/plain", 1, "", "", &[1u8; 16]).unwrap();
        doc.add_file(existing).unwrap();
        for name in ["a.txt", "b.txt"] {
            doc.add_dropped(DropEntry::seal(&key, &dropped(name)).unwrap()).unwrap();
        }

        let migrated = doc.move_from_file_drop_to_files(&key).unwrap();

        assert_eq!(migrated, 2);
        assert!(!doc.is_file_drop_present());
        assert_eq!(doc.files().len(), 3);
        for entry in doc.files().values() {
            assert!(entry.unwrap_file_key(&key).is_ok());
        }
        assert!(doc.files().values().any(|e| e.original_name == "b.txt"));
    }

    #[test]
    fn test_empty_drop_is_noop() {
        let key = FolderKey::generate();
        let mut doc = FolderMetadata::new(FolderId::from("5"), "shared");
        let before = doc.clone();
        assert_eq!(doc.move_from_file_drop_to_files(&key).unwrap(), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_undecryptable_entry_leaves_document_untouched() {
        let key = FolderKey::generate();
        let mut doc = FolderMetadata::new(FolderId::from("5"), "shared");
        doc.add_dropped(DropEntry::seal(&key, &dropped("ok.txt")).unwrap())
            .unwrap();
        doc.add_dropped(DropEntry::seal(&FolderKey::generate(), &dropped("bad.txt")).unwrap())
            .unwrap();
        let before = doc.clone();

        assert!(matches!(
            doc.move_from_file_drop_to_files(&key),
            Err(MetadataError::Crypto { .. })
        ));
        assert_eq!(doc, before);
    }
}
