//! Local journal record for one synced item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::FolderId;

/// What the local journal knows about one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Journal-relative path, without leading or trailing slash.
    pub path: String,
    /// Whether the item is a directory.
    pub is_directory: bool,
    /// Whether the item lives in (or is) an end-to-end encrypted folder.
    pub is_e2e_encrypted: bool,
    /// Obfuscated name the item has on the server, if encrypted.
    pub e2e_mangled_name: Option<String>,
    /// Server-side folder id (directories only).
    pub folder_id: Option<FolderId>,
    /// Last known server etag.
    pub etag: Option<String>,
    /// When the record was last written.
    pub modified_at: DateTime<Utc>,
}

impl JournalRecord {
    /// Parent path of this record, or `None` at the sync root.
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(parent, _)| parent)
    }
}

/// Normalize a path to the journal's convention (no leading/trailing slash).
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Every ancestor of `path` including itself, shortest first.
///
/// `"a/b/c"` yields `["a", "a/b", "a/b/c"]`.
pub fn ancestors_inclusive(path: &str) -> Vec<String> {
    let normalized = normalize_path(path);
    if normalized.is_empty() {
        return Vec::new();
    }
    let mut result = Vec::new();
    for (idx, ch) in normalized.char_indices() {
        if ch == '/' {
            result.push(normalized[..idx].to_string());
        }
    }
    result.push(normalized);
    result
}
