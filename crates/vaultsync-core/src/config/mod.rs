//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod encryption;
pub mod journal;
pub mod logging;
pub mod remote;

use serde::{Deserialize, Serialize};

pub use self::encryption::EncryptionConfig;
pub use self::journal::JournalConfig;
pub use self::logging::LoggingConfig;
pub use self::remote::RemoteConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server account settings.
    pub remote: RemoteConfig,
    /// Local sync journal settings.
    #[serde(default)]
    pub journal: JournalConfig,
    /// Folder keys for encrypted roots.
    #[serde(default)]
    pub encryption: EncryptionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `path` with an environment-specific overlay from the same
    /// directory and environment variables prefixed with `VAULTSYNC__`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let overlay = std::path::Path::new(path)
            .with_file_name(format!("{env}.toml"))
            .to_string_lossy()
            .into_owned();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("VAULTSYNC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
