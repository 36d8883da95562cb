//! Local sync journal configuration.

use serde::{Deserialize, Serialize};

/// SQLite journal connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// SQLite connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_url() -> String {
    "sqlite://data/journal.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}
