//! File-drop migration CLI command.

use clap::Args;

use vaultsync_core::config::AppConfig;
use vaultsync_core::error::AppError;
use vaultsync_core::traits::journal::SyncJournal;
use vaultsync_core::types::record::normalize_path;
use vaultsync_propagator::FileDropMigration;

use crate::output::{self, OutputFormat};

/// Arguments for the file-drop command
#[derive(Debug, Args)]
pub struct FileDropArgs {
    /// Journal path inside the encrypted folder
    pub path: String,
}

/// Execute the file-drop command
pub async fn execute(
    args: &FileDropArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let path = normalize_path(&args.path);

    let root = services
        .journal
        .root_e2e_folder_record(&path)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("'{path}' is not inside an encrypted folder"))
        })?;
    let folder_id = root.folder_id.clone().ok_or_else(|| {
        AppError::validation(format!("Encrypted folder '{}' has no folder id", root.path))
    })?;

    let mut rx = services.events.subscribe();
    let migration =
        FileDropMigration::new(services.coordinator.clone()).with_events(services.events.clone());
    let report = migration.run(&folder_id, &root.path).await?;

    super::print_progress(&mut rx, format);
    match format {
        OutputFormat::Table => output::print_success(&format!(
            "Migrated {} dropped file(s) into '{}'",
            report.migrated, root.path
        )),
        OutputFormat::Json => output::print_item(&report, format),
    }
    Ok(())
}
