//! Metadata document errors.

use vaultsync_core::error::E2eeError;
use vaultsync_core::types::id::EntryId;

use crate::crypto::CryptoError;

/// Why a metadata document could not be parsed, validated or mutated.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The document is not valid JSON or misses required fields.
    #[error("malformed metadata document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The document's format version is not one this client can parse.
    #[error("unsupported metadata version {0}")]
    UnsupportedVersion(u32),
    /// An entry could not be decrypted with the folder key.
    #[error("entry {entry} cannot be decrypted: {source}")]
    Crypto {
        /// The offending entry.
        entry: EntryId,
        /// Underlying crypto failure.
        #[source]
        source: CryptoError,
    },
    /// The same identifier is present in both the entry list and the file drop.
    #[error("entry {0} is present in both files and filedrop")]
    DuplicateEntry(EntryId),
    /// The document is flagged deleted; it accepts no new entries.
    #[error("metadata is flagged deleted")]
    Deleted,
}

impl From<MetadataError> for E2eeError {
    fn from(err: MetadataError) -> Self {
        E2eeError::metadata_invalid(err.to_string())
    }
}
