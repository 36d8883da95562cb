//! The delete propagator state machine.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use vaultsync_core::error::E2eeError;
use vaultsync_core::events::{DeleteEvent, EventBus};
use vaultsync_core::traits::api::DeleteResponse;
use vaultsync_core::traits::journal::SyncJournal;
use vaultsync_core::types::id::{FolderId, JobId};
use vaultsync_core::types::lock::LockHandle;

use super::DeleteItem;
use super::state::{DeleteMode, DeleteState};
use crate::coordinator::MetadataCoordinator;
use crate::lease::LockLease;
use crate::outcome::{DeleteOutcome, ErrorDetail};

/// Journal commit label for confirmed remote deletions.
const COMMIT_LABEL: &str = "Remote Remove";

/// Per-job bookkeeping carried across transitions.
struct DeleteJob<'a> {
    id: JobId,
    item: &'a DeleteItem,
    mode: DeleteMode<'a>,
    held: Option<&'a LockHandle>,
    root_path: String,
    outcome: DeleteOutcome,
}

impl DeleteJob<'_> {
    fn record(&mut self, step: Result<(), ErrorDetail>) {
        self.outcome = std::mem::take(&mut self.outcome).merge(step);
    }

    fn fail(&mut self, error: E2eeError) {
        let detail = ErrorDetail::new(error, self.item.path.clone());
        self.record(Err(detail));
    }
}

/// Deletes items inside end-to-end encrypted folders on the server.
///
/// A root delete flags the scope's metadata deleted before removing the
/// folder; a nested delete only removes the item. Every lock a job
/// acquires is released exactly once, whatever failed before.
#[derive(Debug, Clone)]
pub struct DeletePropagator {
    coordinator: MetadataCoordinator,
    journal: Arc<dyn SyncJournal>,
    events: Option<EventBus>,
}

impl DeletePropagator {
    /// Creates a new delete propagator.
    pub fn new(coordinator: MetadataCoordinator, journal: Arc<dyn SyncJournal>) -> Self {
        Self {
            coordinator,
            journal,
            events: None,
        }
    }

    /// Publishes [`DeleteEvent::Finished`] on `bus` when a job ends.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Deletes the root of an encryption scope.
    pub async fn delete_root(&self, item: &DeleteItem) -> DeleteOutcome {
        self.run(item, DeleteMode::Root, None).await
    }

    /// Deletes an item inside an encryption scope.
    ///
    /// With `held`, the enclosing operation's lock is borrowed and neither
    /// lock nor unlock is called. Without it, an item that is itself an
    /// encrypted folder with its own folder id goes through the root
    /// sequence on that folder. Any other item locks the owning scope, whose
    /// metadata is validated around the delete but not modified.
    pub async fn delete_nested(
        &self,
        item: &DeleteItem,
        held: Option<&LockHandle>,
    ) -> DeleteOutcome {
        self.run(item, DeleteMode::Nested, held).await
    }

    /// Deletes a scope root after removing its listed children one by one
    /// under the root's lock.
    ///
    /// If any child fails, the root is neither flagged nor deleted.
    pub async fn delete_tree(&self, root: &DeleteItem, children: &[DeleteItem]) -> DeleteOutcome {
        self.run(root, DeleteMode::Tree { children }, None).await
    }

    async fn run<'a>(
        &self,
        item: &'a DeleteItem,
        mode: DeleteMode<'a>,
        held: Option<&'a LockHandle>,
    ) -> DeleteOutcome {
        let mut job = DeleteJob {
            id: JobId::generate(),
            item,
            mode,
            held,
            root_path: String::new(),
            outcome: DeleteOutcome::new(),
        };
        info!(job_id = %job.id, path = %item.path, mode = ?mode, "Delete propagation started");

        let mut state = DeleteState::Start;
        while !state.is_done() {
            let from = state.name();
            state = self.advance(&mut job, state).await;
            debug!(job_id = %job.id, from, to = state.name(), "Delete transition");
        }

        self.finish(job)
    }

    async fn advance<'a>(
        &self,
        job: &mut DeleteJob<'a>,
        state: DeleteState<'a>,
    ) -> DeleteState<'a> {
        match state {
            DeleteState::Start => {
                if let DeleteMode::Nested = job.mode {
                    if let Some(lock) = job.held {
                        return DeleteState::RawDelete {
                            lease: LockLease::Adopted(lock),
                        };
                    }
                    if self.is_sub_root(job.item).await {
                        info!(path = %job.item.path, "Nested item is an encrypted root");
                        job.mode = DeleteMode::Root;
                    }
                }
                match self.resolve_scope(job.item, job.mode).await {
                    Ok((folder_id, root_path)) => {
                        job.root_path = root_path;
                        DeleteState::AcquiringLock { folder_id }
                    }
                    Err(e) => {
                        error!(path = %job.item.path, error = %e, "Cannot resolve encrypted scope");
                        job.fail(e);
                        DeleteState::Done
                    }
                }
            }

            DeleteState::AcquiringLock { folder_id } => {
                match self.coordinator.acquire_lock(&folder_id).await {
                    Ok(lock) => DeleteState::FetchingMetadata {
                        lease: LockLease::Acquired(lock),
                    },
                    Err(e) => {
                        job.fail(e);
                        DeleteState::Done
                    }
                }
            }

            DeleteState::FetchingMetadata { lease } => {
                let fetched = self
                    .coordinator
                    .fetch_metadata(lease.handle(), &job.root_path)
                    .await;
                match fetched {
                    Ok(document) => match job.mode {
                        DeleteMode::Root => DeleteState::MarkingDeleted { lease, document },
                        DeleteMode::Tree { .. } => {
                            DeleteState::DeletingChildren { lease, document }
                        }
                        DeleteMode::Nested => DeleteState::RawDelete { lease },
                    },
                    Err(e) => {
                        job.fail(e);
                        DeleteState::Unlocking { lease }
                    }
                }
            }

            DeleteState::DeletingChildren { lease, document } => {
                if let DeleteMode::Tree { children } = job.mode {
                    for child in children {
                        let step = self.raw_delete_step(child, lease.handle()).await;
                        job.record(step);
                    }
                }
                if job.outcome.is_success() {
                    DeleteState::MarkingDeleted { lease, document }
                } else {
                    warn!(path = %job.item.path, "Child deletes failed, root metadata untouched");
                    DeleteState::Unlocking { lease }
                }
            }

            DeleteState::MarkingDeleted { lease, mut document } => {
                document.flag_deleted_set();
                DeleteState::Uploading { lease, document }
            }

            DeleteState::Uploading { lease, document } => {
                let uploaded = self
                    .coordinator
                    .upload_metadata(lease.handle(), &document)
                    .await;
                match uploaded {
                    Ok(()) => DeleteState::RawDelete { lease },
                    Err(e) => {
                        job.fail(e);
                        DeleteState::Unlocking { lease }
                    }
                }
            }

            DeleteState::RawDelete { lease } => {
                let step = self.raw_delete_step(job.item, lease.handle()).await;
                job.record(step);
                DeleteState::Unlocking { lease }
            }

            DeleteState::Unlocking { lease } => {
                let success = job.outcome.is_success();
                if let Err(e) = self.coordinator.release(lease, success).await {
                    job.fail(e);
                }
                DeleteState::Done
            }

            DeleteState::Done => DeleteState::Done,
        }
    }

    /// Whether `item` is an encrypted folder with its own metadata.
    async fn is_sub_root(&self, item: &DeleteItem) -> bool {
        match self.journal.file_record(&item.path).await {
            Ok(Some(record)) => {
                record.is_directory && record.is_e2e_encrypted && record.folder_id.is_some()
            }
            Ok(None) => false,
            Err(e) => {
                warn!(path = %item.path, error = %e, "Journal lookup failed, deleting as nested");
                false
            }
        }
    }

    /// Finds the folder id and root path of the scope the job locks.
    async fn resolve_scope(
        &self,
        item: &DeleteItem,
        mode: DeleteMode<'_>,
    ) -> Result<(FolderId, String), E2eeError> {
        let lookup = match mode {
            DeleteMode::Nested => self.journal.root_e2e_folder_record(&item.path).await,
            DeleteMode::Root | DeleteMode::Tree { .. } => {
                self.journal.file_record(&item.path).await
            }
        };
        let record = lookup
            .map_err(|e| E2eeError::not_found(format!("journal record for {}: {e}", item.path)))?
            .ok_or_else(|| E2eeError::not_found(format!("encrypted root of {}", item.path)))?;

        if !(record.is_directory && record.is_e2e_encrypted) {
            return Err(E2eeError::metadata_invalid(format!(
                "{} is not an encrypted folder",
                record.path
            )));
        }
        let folder_id = record.folder_id.ok_or_else(|| {
            E2eeError::metadata_invalid(format!(
                "encrypted folder {} has no folder id",
                record.path
            ))
        })?;
        Ok((folder_id, record.path))
    }

    /// Deletes one path under `lock` and, once the server confirmed it is
    /// gone, removes its journal record.
    ///
    /// The server only knows encrypted items by their mangled names, so the
    /// request goes to the remote path the journal resolves.
    async fn raw_delete_step(
        &self,
        item: &DeleteItem,
        lock: &LockHandle,
    ) -> Result<(), ErrorDetail> {
        let remote = self.journal.remote_path(&item.path).await.map_err(|e| {
            error!(path = %item.path, error = %e, "Cannot resolve remote path");
            ErrorDetail::new(
                E2eeError::not_found(format!("remote path of {}: {e}", item.path)),
                item.path.clone(),
            )
        })?;

        let response = self.coordinator.delete_path(&remote, lock).await.map_err(|e| {
            error!(path = %item.path, remote = %remote, error = %e, "Remote delete failed");
            ErrorDetail::new(e, item.path.clone())
        })?;

        match response.status {
            DeleteResponse::NO_CONTENT => {
                debug!(path = %item.path, remote = %remote, "Remote item deleted");
            }
            DeleteResponse::NOT_FOUND => {
                warn!(path = %item.path, remote = %remote, "Remote item already absent");
            }
            status => {
                error!(
                    path = %item.path,
                    remote = %remote,
                    status,
                    "Unexpected HTTP status for delete, expected 204"
                );
                return Err(ErrorDetail::new(
                    E2eeError::DeleteRejected { status },
                    item.path.clone(),
                ));
            }
        }

        match self
            .journal
            .delete_file_record(&item.path, item.is_directory)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(path = %item.path, "No journal record to remove"),
            Err(e) => {
                warn!(path = %item.path, error = %e, "Failed to delete file record from journal")
            }
        }
        if let Err(e) = self.journal.commit(COMMIT_LABEL).await {
            warn!(path = %item.path, error = %e, "Failed to commit journal");
        }
        Ok(())
    }

    fn finish(&self, job: DeleteJob<'_>) -> DeleteOutcome {
        let DeleteJob {
            id, item, outcome, ..
        } = job;

        match outcome.first_error() {
            None => info!(job_id = %id, path = %item.path, "Delete propagation finished"),
            Some(detail) => warn!(
                job_id = %id,
                path = %item.path,
                failed_path = %detail.path,
                error = %detail.error,
                "Delete propagation failed"
            ),
        }

        if let Some(bus) = &self.events {
            bus.publish(DeleteEvent::Finished {
                job_id: id,
                path: item.path.clone(),
                success: outcome.is_success(),
                error: outcome.first_error().map(|detail| detail.error.clone()),
            });
        }
        outcome
    }
}
