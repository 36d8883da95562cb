//! Encrypted delete CLI command.

use clap::Args;

use vaultsync_core::config::AppConfig;
use vaultsync_core::error::AppError;
use vaultsync_core::traits::journal::SyncJournal;
use vaultsync_core::types::record::{JournalRecord, normalize_path};
use vaultsync_propagator::{DeleteItem, DeletePropagator};

use crate::output::{self, OutputFormat};

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Journal path of the item to delete
    pub path: String,

    /// Skip the confirmation prompt for encrypted roots
    #[arg(short, long)]
    pub yes: bool,

    /// Delete the root's direct children one by one before the root itself
    #[arg(long)]
    pub tree: bool,
}

/// Execute the delete command
pub async fn execute(
    args: &DeleteArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let path = normalize_path(&args.path);

    let record = services
        .journal
        .file_record(&path)
        .await?
        .ok_or_else(|| AppError::not_found(format!("'{}' is not in the journal", path)))?;
    if !record.is_e2e_encrypted {
        return Err(AppError::validation(format!(
            "'{}' is not inside an encrypted folder",
            path
        )));
    }

    let is_root = services
        .journal
        .root_e2e_folder_record(&path)
        .await?
        .is_some_and(|root| root.path == path);
    if args.tree && !is_root {
        return Err(AppError::validation(format!(
            "--tree needs an encrypted root, '{}' is nested",
            path
        )));
    }

    let propagator = DeletePropagator::new(services.coordinator.clone(), services.journal.clone())
        .with_events(services.events.clone());
    let mut rx = services.events.subscribe();

    let outcome = if is_root {
        if !args.yes {
            let confirm = dialoguer::Confirm::new()
                .with_prompt(format!(
                    "Delete encrypted folder '{}' and everything in it on the server?",
                    path
                ))
                .default(false)
                .interact()
                .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

            if !confirm {
                println!("Cancelled.");
                return Ok(());
            }
        }

        let root = DeleteItem::directory(&path);
        if args.tree {
            let children: Vec<DeleteItem> = services
                .journal
                .list_records(Some(&path))
                .await?
                .iter()
                .filter(|r| r.parent_path() == Some(path.as_str()))
                .map(to_item)
                .collect();
            propagator.delete_tree(&root, &children).await
        } else {
            propagator.delete_root(&root).await
        }
    } else {
        propagator.delete_nested(&to_item(&record), None).await
    };

    super::print_progress(&mut rx, format);
    if format == OutputFormat::Json {
        output::print_item(&outcome, format);
    }

    match outcome.into_result() {
        Ok(()) => {
            if format == OutputFormat::Table {
                output::print_success(&format!("Deleted '{}'", path));
            }
            Ok(())
        }
        Err(detail) => {
            let err = AppError::from(detail.error);
            Err(AppError::new(
                err.kind,
                format!("{} ({})", err.message, detail.path),
            ))
        }
    }
}

fn to_item(record: &JournalRecord) -> DeleteItem {
    if record.is_directory {
        DeleteItem::directory(&record.path)
    } else {
        DeleteItem::file(&record.path)
    }
}
