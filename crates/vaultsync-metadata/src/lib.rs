//! # vaultsync-metadata
//!
//! The folder metadata document of an end-to-end encrypted folder: its
//! integrated file entries, the pending file-drop area, the deleted flag,
//! and the wire format the server stores.

pub mod crypto;
pub mod document;
pub mod entry;
pub mod error;
pub mod file_drop;
pub mod keys;
pub mod wire;

pub use crypto::FolderKey;
pub use document::FolderMetadata;
pub use entry::{DropEntry, DroppedFile, FileEntry};
pub use error::MetadataError;
pub use keys::{FolderKeyProvider, StaticKeyring};
