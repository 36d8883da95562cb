//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use vaultsync_client::HttpE2eeClient;
use vaultsync_core::config::AppConfig;
use vaultsync_core::error::AppError;
use vaultsync_metadata::StaticKeyring;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            output::print_item(&masked(config), format);
        }
        ConfigCommand::Validate => {
            HttpE2eeClient::new(&config.remote)?;
            let keyring = StaticKeyring::from_config(&config.encryption)?;

            output::print_success("Configuration is valid");
            output::print_kv("Server", &config.remote.base_url);
            output::print_kv("User", &config.remote.username);
            output::print_kv("Journal", &config.journal.url);
            output::print_kv("Folder keys", &keyring.len().to_string());
        }
    }

    Ok(())
}

/// A copy of `config` with secrets replaced
fn masked(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    if !config.remote.app_password.is_empty() {
        config.remote.app_password = "****".to_string();
    }
    for key in config.encryption.folder_keys.values_mut() {
        *key = "****".to_string();
    }
    config
}
