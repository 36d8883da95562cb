//! Server account configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the sync server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Server base URL, e.g. `https://cloud.example.com`.
    pub base_url: String,
    /// Account user name; also the WebDAV root segment.
    pub username: String,
    /// App password used for HTTP basic authentication.
    #[serde(default)]
    pub app_password: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("vaultsync/{}", env!("CARGO_PKG_VERSION"))
}
