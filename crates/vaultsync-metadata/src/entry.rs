//! Entries of a metadata document.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoError, FolderKey};

/// Associated data binding a wrapped file key to its purpose.
pub(crate) const FILE_KEY_AAD: &[u8] = b"file-key";
/// Associated data of a sealed file-drop payload.
pub(crate) const FILE_DROP_AAD: &[u8] = b"filedrop";

/// An integrated file of the encrypted folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Obfuscated name of the file on the server.
    pub encrypted_name: String,
    /// Name the user sees.
    pub original_name: String,
    /// MIME type of the plaintext.
    pub mime_type: String,
    /// Plaintext size in bytes.
    pub size: u64,
    /// Base64 IV used to encrypt the file contents.
    pub initialization_vector: String,
    /// Base64 GCM tag of the file contents.
    pub authentication_tag: String,
    /// The per-file content key, wrapped with the folder key.
    pub wrapped_file_key: String,
}

impl FileEntry {
    /// Build an entry, wrapping `file_key` with the folder key.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        folder_key: &FolderKey,
        encrypted_name: impl Into<String>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        initialization_vector: impl Into<String>,
        authentication_tag: impl Into<String>,
        file_key: &[u8],
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            encrypted_name: encrypted_name.into(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            size,
            initialization_vector: initialization_vector.into(),
            authentication_tag: authentication_tag.into(),
            wrapped_file_key: folder_key.wrap(file_key, FILE_KEY_AAD)?,
        })
    }

    /// Recover the per-file content key.
    pub fn unwrap_file_key(&self, folder_key: &FolderKey) -> Result<Vec<u8>, CryptoError> {
        folder_key.unwrap(&self.wrapped_file_key, FILE_KEY_AAD)
    }
}

/// A file uploaded through a share link, as the uploader described it.
///
/// Drop uploaders cannot read the folder's entry list, so they seal this
/// payload with the folder key and leave it in the file drop for a full
/// client to integrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedFile {
    /// Obfuscated name of the file on the server.
    pub encrypted_name: String,
    /// Name the user sees.
    #[serde(rename = "filename")]
    pub original_name: String,
    /// MIME type of the plaintext.
    #[serde(rename = "mimetype")]
    pub mime_type: String,
    /// Plaintext size in bytes.
    pub size: u64,
    /// Base64 per-file content key, in the clear inside the sealed payload.
    pub key: String,
    /// Base64 IV used to encrypt the file contents.
    pub initialization_vector: String,
    /// Base64 GCM tag of the file contents.
    pub authentication_tag: String,
}

/// A sealed, not yet integrated file-drop entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Base64 ciphertext of the [`DroppedFile`] JSON.
    pub ciphertext: String,
    /// Base64 nonce.
    pub nonce: String,
}

impl DropEntry {
    /// Seal a dropped file with the folder key.
    pub fn seal(folder_key: &FolderKey, file: &DroppedFile) -> Result<Self, CryptoError> {
        let plaintext = serde_json::to_vec(file).map_err(|_| CryptoError::Encrypt)?;
        let sealed = folder_key.seal(&plaintext, FILE_DROP_AAD)?;
        Ok(Self {
            ciphertext: STANDARD.encode(sealed.ciphertext),
            nonce: STANDARD.encode(sealed.nonce),
        })
    }

    /// Decrypt the payload with the folder key.
    pub fn open(&self, folder_key: &FolderKey) -> Result<DroppedFile, CryptoError> {
        let nonce = STANDARD.decode(&self.nonce)?;
        let ciphertext = STANDARD.decode(&self.ciphertext)?;
        let plaintext = folder_key.open(&nonce, &ciphertext, FILE_DROP_AAD)?;
        serde_json::from_slice(&plaintext).map_err(|_| CryptoError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key_wrapping() {
        let key = FolderKey::generate();
        let entry = FileEntry::new(
            &key,
            "a1b2",
            "notes.txt",
            "text/plain",
            5,
            "iv",
            "tag",
            &[7u8; 16],
        )
        .unwrap();
        assert_eq!(entry.unwrap_file_key(&key).unwrap(), vec![7u8; 16]);
        assert!(entry.unwrap_file_key(&FolderKey::generate()).is_err());
    }

    #[test]
    fn test_drop_entry_seal_open() {
        let key = FolderKey::generate();
        let dropped = DroppedFile {
            encrypted_name: "c3d4".into(),
            original_name: "photo.jpg".into(),
            mime_type: "image/jpeg".into(),
            size: 2048,
            key: "a2V5".into(),
            initialization_vector: "aXY=".into(),
            authentication_tag: "dGFn".into(),
        };
        let entry = DropEntry::seal(&key, &dropped).unwrap();
        assert_eq!(entry.open(&key).unwrap(), dropped);
    }
}
