//! Remote delete propagation for items inside encrypted folders.

mod propagator;
mod state;

use serde::{Deserialize, Serialize};

use vaultsync_core::types::record::normalize_path;

pub use propagator::DeletePropagator;

/// One item to delete on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItem {
    /// Journal-relative path.
    pub path: String,
    pub is_directory: bool,
}

impl DeleteItem {
    pub fn file(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            is_directory: false,
        }
    }

    pub fn directory(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            is_directory: true,
        }
    }
}
