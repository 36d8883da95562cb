//! Local journal CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use vaultsync_core::config::AppConfig;
use vaultsync_core::error::AppError;
use vaultsync_core::types::id::FolderId;
use vaultsync_core::types::record::JournalRecord;

use crate::output::{self, OutputFormat};

/// Arguments for journal commands
#[derive(Debug, Args)]
pub struct JournalArgs {
    /// Journal subcommand
    #[command(subcommand)]
    pub command: JournalCommand,
}

/// Journal subcommands
#[derive(Debug, Subcommand)]
pub enum JournalCommand {
    /// List journal records
    List {
        /// Only records at or below this path
        #[arg(short, long)]
        under: Option<String>,
    },
    /// Add or replace a journal record
    Add {
        /// Journal path
        path: String,
        /// The item is a directory
        #[arg(long)]
        dir: bool,
        /// The item is end-to-end encrypted
        #[arg(long)]
        encrypted: bool,
        /// Server folder id (encrypted directories)
        #[arg(long)]
        folder_id: Option<String>,
        /// Obfuscated server-side name
        #[arg(long)]
        mangled_name: Option<String>,
    },
}

/// Journal display row
#[derive(Debug, Serialize, Tabled)]
struct RecordRow {
    /// Path
    path: String,
    /// Kind
    kind: &'static str,
    /// Encrypted
    encrypted: bool,
    /// Folder ID
    folder_id: String,
    /// Modified at
    modified_at: String,
}

/// Execute journal commands
pub async fn execute(
    args: &JournalArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let journal = super::open_journal(config).await?;

    match &args.command {
        JournalCommand::List { under } => {
            let records = journal.list_records(under.as_deref()).await?;
            let rows: Vec<RecordRow> = records
                .iter()
                .map(|r| RecordRow {
                    path: r.path.clone(),
                    kind: if r.is_directory { "dir" } else { "file" },
                    encrypted: r.is_e2e_encrypted,
                    folder_id: r
                        .folder_id
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    modified_at: r.modified_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        JournalCommand::Add {
            path,
            dir,
            encrypted,
            folder_id,
            mangled_name,
        } => {
            if folder_id.is_some() && !dir {
                return Err(AppError::validation("Only directories carry a folder id"));
            }
            let record = JournalRecord {
                path: path.clone(),
                is_directory: *dir,
                is_e2e_encrypted: *encrypted,
                e2e_mangled_name: mangled_name.clone(),
                folder_id: folder_id.as_deref().map(FolderId::from),
                etag: None,
                modified_at: Utc::now(),
            };
            journal.upsert_record(record).await?;
            output::print_success(&format!("Recorded '{}'", path));
        }
    }

    Ok(())
}
