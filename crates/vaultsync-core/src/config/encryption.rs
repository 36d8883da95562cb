//! Folder key configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Folder keys for end-to-end encrypted roots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// Encryption-root path (journal-relative) → base64 encoded 32-byte folder key.
    #[serde(default)]
    pub folder_keys: HashMap<String, String>,
}
