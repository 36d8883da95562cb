//! CLI command definitions and dispatch.

pub mod config;
pub mod delete;
pub mod file_drop;
pub mod journal;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use vaultsync_client::HttpE2eeClient;
use vaultsync_core::config::AppConfig;
use vaultsync_core::error::AppError;
use vaultsync_core::events::{EventBus, EventPayload, MetadataEvent, SyncEvent};
use vaultsync_journal::{JournalPool, SqliteJournal};
use vaultsync_metadata::StaticKeyring;
use vaultsync_propagator::MetadataCoordinator;

use crate::output::{self, OutputFormat};

/// VaultSync: end-to-end encrypted folder sync client
#[derive(Debug, Parser)]
#[command(name = "vaultsync", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Delete an item inside an encrypted folder on the server
    Delete(delete::DeleteArgs),
    /// Merge share-link uploads into a folder's metadata
    FileDrop(file_drop::FileDropArgs),
    /// Local sync journal
    Journal(journal::JournalArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Delete(args) => delete::execute(args, &config, self.format).await,
            Commands::FileDrop(args) => file_drop::execute(args, &config, self.format).await,
            Commands::Journal(args) => journal::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Everything a server-facing command needs.
pub struct Services {
    pub journal: Arc<SqliteJournal>,
    pub coordinator: MetadataCoordinator,
    pub events: EventBus,
}

/// Helper: open the journal, ensuring its directory exists
pub async fn open_journal(config: &AppConfig) -> Result<Arc<SqliteJournal>, AppError> {
    if let Some(dir) = journal_dir(&config.journal.url) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create journal dir: {}", e)))?;
    }
    let pool = JournalPool::connect(&config.journal).await?;
    Ok(Arc::new(SqliteJournal::new(&pool)))
}

/// Helper: wire the server client, keyring and journal
pub async fn build_services(config: &AppConfig) -> Result<Services, AppError> {
    let api = Arc::new(HttpE2eeClient::new(&config.remote)?);
    let keys = Arc::new(StaticKeyring::from_config(&config.encryption)?);
    let events = EventBus::default();
    let coordinator = MetadataCoordinator::new(api, keys).with_events(events.clone());

    Ok(Services {
        journal: open_journal(config).await?,
        coordinator,
        events,
    })
}

/// Directory holding a file-backed SQLite journal, if any.
fn journal_dir(url: &str) -> Option<&std::path::Path> {
    let path = url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    std::path::Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Print the metadata steps received on `rx` as progress lines.
pub fn print_progress(rx: &mut tokio::sync::broadcast::Receiver<SyncEvent>, format: OutputFormat) {
    while let Ok(event) = rx.try_recv() {
        if format != OutputFormat::Table {
            continue;
        }
        if let EventPayload::Metadata(step) = event.payload {
            output::print_step(&describe(&step));
        }
    }
}

fn describe(step: &MetadataEvent) -> String {
    match step {
        MetadataEvent::FolderLocked { folder_id } => format!("locked folder {folder_id}"),
        MetadataEvent::MetadataFetched {
            folder_id,
            entries,
            pending_drop,
        } => format!("fetched metadata of {folder_id} ({entries} entries, {pending_drop} dropped)"),
        MetadataEvent::MetadataUploaded { folder_id, deleted } => {
            format!("uploaded metadata of {folder_id} (deleted: {deleted})")
        }
        MetadataEvent::FileDropMigrated {
            folder_id,
            migrated,
        } => format!("migrated {migrated} dropped files into {folder_id}"),
        MetadataEvent::FolderUnlocked { folder_id, success } => {
            format!("unlocked folder {folder_id} (success: {success})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_dir() {
        assert_eq!(
            journal_dir("sqlite://data/journal.db?mode=rwc"),
            Some(std::path::Path::new("data"))
        );
        assert_eq!(journal_dir("sqlite::memory:"), None);
        assert_eq!(journal_dir("sqlite://journal.db"), None);
    }

    #[test]
    fn test_cli_parses_delete() {
        let cli = Cli::parse_from(["vaultsync", "--format", "json", "delete", "/shared", "--yes"]);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Delete(args) => {
                assert_eq!(args.path, "/shared");
                assert!(args.yes);
                assert!(!args.tree);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
