//! JSON wire format of the metadata document.
//!
//! ```json
//! {
//!   "metadata": { "version": 2, "deleted": false },
//!   "files":    { "<id>": { "encryptedName": "...", "size": 12, "initializationVector": "...",
//!                           "authenticationTag": "...", "wrappedKey": "...",
//!                           "encrypted": "...", "nonce": "..." } },
//!   "filedrop": { "<id>": { "ciphertext": "...", "nonce": "..." } }
//! }
//! ```
//!
//! `encrypted` seals `{filename, mimetype}` under the folder key, so the
//! server only ever sees obfuscated names.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use vaultsync_core::types::id::{EntryId, FolderId};

use crate::crypto::{CryptoError, FolderKey};
use crate::document::FolderMetadata;
use crate::entry::{DropEntry, FileEntry};
use crate::error::MetadataError;

const FILES_AAD: &[u8] = b"files";

#[derive(Debug, Serialize, Deserialize)]
struct WireDocument {
    metadata: WireHeader,
    #[serde(default)]
    files: BTreeMap<EntryId, WireFile>,
    #[serde(default, rename = "filedrop")]
    file_drop: BTreeMap<EntryId, DropEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireHeader {
    version: u32,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFile {
    encrypted_name: String,
    size: u64,
    initialization_vector: String,
    authentication_tag: String,
    wrapped_key: String,
    encrypted: String,
    nonce: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SealedNames {
    filename: String,
    mimetype: String,
}

impl FolderMetadata {
    /// Parse and validate a document downloaded for `folder_id`.
    ///
    /// Every integrated entry must decrypt with `folder_key`; file-drop
    /// entries stay sealed until migration.
    pub fn parse(
        raw: &str,
        folder_id: FolderId,
        root_path: impl Into<String>,
        folder_key: &FolderKey,
    ) -> Result<Self, MetadataError> {
        let wire: WireDocument = serde_json::from_str(raw)?;

        let mut files = BTreeMap::new();
        for (id, file) in wire.files {
            let names = open_names(folder_key, &file).map_err(|source| MetadataError::Crypto {
                entry: id.clone(),
                source,
            })?;
            files.insert(
                id,
                FileEntry {
                    encrypted_name: file.encrypted_name,
                    original_name: names.filename,
                    mime_type: names.mimetype,
                    size: file.size,
                    initialization_vector: file.initialization_vector,
                    authentication_tag: file.authentication_tag,
                    wrapped_file_key: file.wrapped_key,
                },
            );
        }

        Self::from_parts(
            folder_id,
            root_path.into(),
            wire.metadata.version,
            wire.metadata.deleted,
            files,
            wire.file_drop,
        )
    }

    /// Serialize for upload, re-sealing entry names with fresh nonces.
    pub fn to_wire(&self, folder_key: &FolderKey) -> Result<String, MetadataError> {
        let mut files = BTreeMap::new();
        for (id, entry) in self.files() {
            let wire = seal_names(folder_key, entry).map_err(|source| MetadataError::Crypto {
                entry: id.clone(),
                source,
            })?;
            files.insert(id.clone(), wire);
        }

        let document = WireDocument {
            metadata: WireHeader {
                version: self.version(),
                deleted: self.is_deleted(),
            },
            files,
            file_drop: self.file_drop().clone(),
        };
        Ok(serde_json::to_string(&document)?)
    }
}

fn open_names(folder_key: &FolderKey, file: &WireFile) -> Result<SealedNames, CryptoError> {
    let nonce = STANDARD.decode(&file.nonce)?;
    let ciphertext = STANDARD.decode(&file.encrypted)?;
    let plaintext = folder_key.open(&nonce, &ciphertext, FILES_AAD)?;
    serde_json::from_slice(&plaintext).map_err(|_| CryptoError::Decrypt)
}

fn seal_names(folder_key: &FolderKey, entry: &FileEntry) -> Result<WireFile, CryptoError> {
    let names = SealedNames {
        filename: entry.original_name.clone(),
        mimetype: entry.mime_type.clone(),
    };
    let plaintext = serde_json::to_vec(&names).map_err(|_| CryptoError::Encrypt)?;
    let sealed = folder_key.seal(&plaintext, FILES_AAD)?;
    Ok(WireFile {
        encrypted_name: entry.encrypted_name.clone(),
        size: entry.size,
        initialization_vector: entry.initialization_vector.clone(),
        authentication_tag: entry.authentication_tag.clone(),
        wrapped_key: entry.wrapped_file_key.clone(),
        encrypted: STANDARD.encode(sealed.ciphertext),
        nonce: STANDARD.encode(sealed.nonce),
    })
}
