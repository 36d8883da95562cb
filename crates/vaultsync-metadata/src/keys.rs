//! Folder key lookup.

use std::collections::HashMap;

use vaultsync_core::config::EncryptionConfig;
use vaultsync_core::error::{AppError, E2eeError};
use vaultsync_core::result::AppResult;
use vaultsync_core::types::record::{ancestors_inclusive, normalize_path};

use crate::crypto::FolderKey;

/// Resolves the folder key of an encryption root.
pub trait FolderKeyProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The key for the scope rooted at `root_path`.
    fn folder_key(&self, root_path: &str) -> Result<FolderKey, E2eeError>;
}

/// Keys known up front, indexed by normalized root path.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyring {
    keys: HashMap<String, FolderKey>,
}

impl StaticKeyring {
    /// Create an empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a keyring from the `[encryption.folder_keys]` table.
    pub fn from_config(config: &EncryptionConfig) -> AppResult<Self> {
        let mut keyring = Self::new();
        for (root, encoded) in &config.folder_keys {
            let key = FolderKey::from_base64(encoded).map_err(|e| {
                AppError::configuration(format!("Invalid folder key for '{root}': {e}"))
            })?;
            keyring.insert(root, key);
        }
        Ok(keyring)
    }

    /// Register the key of a root.
    pub fn insert(&mut self, root_path: &str, key: FolderKey) {
        self.keys.insert(normalize_path(root_path), key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FolderKeyProvider for StaticKeyring {
    /// Encrypted folders nested in a configured root share its key, so the
    /// closest configured ancestor wins.
    fn folder_key(&self, root_path: &str) -> Result<FolderKey, E2eeError> {
        ancestors_inclusive(root_path)
            .iter()
            .rev()
            .find_map(|candidate| self.keys.get(candidate))
            .cloned()
            .ok_or_else(|| {
                E2eeError::metadata_invalid(format!(
                    "no folder key for encrypted root '{root_path}'"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_normalizes_path() {
        let key = FolderKey::generate();
        let mut keyring = StaticKeyring::new();
        keyring.insert("/shared/", key.clone());
        assert_eq!(keyring.folder_key("shared").unwrap(), key);
        assert!(matches!(
            keyring.folder_key("other"),
            Err(E2eeError::MetadataInvalid { .. })
        ));
    }

    #[test]
    fn test_nested_folder_uses_closest_configured_root() {
        let shared = FolderKey::generate();
        let inner = FolderKey::generate();
        let mut keyring = StaticKeyring::new();
        keyring.insert("shared", shared.clone());
        keyring.insert("shared/inner", inner.clone());

        assert_eq!(keyring.folder_key("shared/sub").unwrap(), shared);
        assert_eq!(keyring.folder_key("/shared/inner/deep/").unwrap(), inner);
        assert!(keyring.folder_key("sharedx").is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_key() {
        let mut config = EncryptionConfig::default();
        config.folder_keys.insert("shared".into(), "AAAA".into());
        assert!(StaticKeyring::from_config(&config).is_err());
    }
}
