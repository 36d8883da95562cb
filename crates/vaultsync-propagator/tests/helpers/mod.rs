//! Shared test helpers for propagator integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use vaultsync_client::MemoryE2eeServer;
use vaultsync_core::error::AppError;
use vaultsync_core::events::EventBus;
use vaultsync_core::result::AppResult;
use vaultsync_core::traits::api::E2eeApi;
use vaultsync_core::traits::journal::SyncJournal;
use vaultsync_core::types::id::FolderId;
use vaultsync_core::types::record::JournalRecord;
use vaultsync_journal::{JournalPool, SqliteJournal};
use vaultsync_metadata::{
    DropEntry, DroppedFile, FileEntry, FolderKey, FolderMetadata, StaticKeyring,
};
use vaultsync_propagator::{DeletePropagator, FileDropMigration, MetadataCoordinator};

/// Encryption roots the test keyring knows about.
pub const ROOTS: [&str; 2] = ["shared", "team"];

/// Test environment: an in-process server, an in-memory journal and the
/// jobs wired to them.
pub struct TestEnv {
    /// The fake server
    pub server: Arc<MemoryE2eeServer>,
    /// The local journal
    pub journal: Arc<SqliteJournal>,
    /// Folder key shared by every test root
    pub key: FolderKey,
    pub events: EventBus,
    pub coordinator: MetadataCoordinator,
    pub propagator: DeletePropagator,
    pub migration: FileDropMigration,
}

impl TestEnv {
    /// Create a new test environment
    pub async fn new() -> Self {
        let key = FolderKey::generate();
        let mut keyring = StaticKeyring::new();
        for root in ROOTS {
            keyring.insert(root, key.clone());
        }

        let server = Arc::new(MemoryE2eeServer::new());
        let api: Arc<dyn E2eeApi> = server.clone();

        let pool = JournalPool::in_memory()
            .await
            .expect("Failed to open in-memory journal");
        let journal = Arc::new(SqliteJournal::new(&pool));
        let journal_dyn: Arc<dyn SyncJournal> = journal.clone();

        let events = EventBus::new(64);
        let coordinator =
            MetadataCoordinator::new(api, Arc::new(keyring)).with_events(events.clone());
        let propagator =
            DeletePropagator::new(coordinator.clone(), journal_dyn).with_events(events.clone());
        let migration = FileDropMigration::new(coordinator.clone()).with_events(events.clone());

        Self {
            server,
            journal,
            key,
            events,
            coordinator,
            propagator,
            migration,
        }
    }

    /// A propagator over the same coordinator but a different journal.
    pub fn propagator_with(&self, journal: Arc<dyn SyncJournal>) -> DeletePropagator {
        DeletePropagator::new(self.coordinator.clone(), journal)
    }

    /// Register an encrypted root on the server and in the journal.
    pub async fn add_encrypted_root(
        &self,
        path: &str,
        folder_id: &str,
        document: &FolderMetadata,
    ) {
        let raw = document.to_wire(&self.key).expect("Failed to serialize metadata");
        self.server.add_folder(folder_id, Some(raw)).await;
        self.server.add_path(path).await;
        self.add_record(path, true, Some(folder_id)).await;
    }

    /// Register an item inside an encrypted scope on the server and in the journal.
    pub async fn add_encrypted_item(&self, path: &str, is_directory: bool) {
        self.server.add_path(path).await;
        self.add_record(path, is_directory, None).await;
    }

    /// Register a file the server only knows as `remote`, whose last
    /// segment is the mangled name.
    pub async fn add_mangled_file(&self, path: &str, remote: &str) {
        self.server.add_path(remote).await;
        let mangled = remote.rsplit('/').next().map(str::to_string);
        self.journal
            .upsert_record(JournalRecord {
                path: path.to_string(),
                is_directory: false,
                is_e2e_encrypted: true,
                e2e_mangled_name: mangled,
                folder_id: None,
                etag: None,
                modified_at: Utc::now(),
            })
            .await
            .expect("Failed to insert journal record");
    }

    /// Insert an encrypted journal record without touching the server.
    pub async fn add_record(&self, path: &str, is_directory: bool, folder_id: Option<&str>) {
        self.journal
            .upsert_record(JournalRecord {
                path: path.to_string(),
                is_directory,
                is_e2e_encrypted: true,
                e2e_mangled_name: None,
                folder_id: folder_id.map(FolderId::from),
                etag: None,
                modified_at: Utc::now(),
            })
            .await
            .expect("Failed to insert journal record");
    }

    /// Parse the document the server currently stores for a folder.
    pub async fn stored_document(&self, folder_id: &str, root_path: &str) -> FolderMetadata {
        let raw = self
            .server
            .stored_metadata(&FolderId::from(folder_id))
            .await
            .expect("No metadata stored");
        FolderMetadata::parse(&raw, FolderId::from(folder_id), root_path, &self.key)
            .expect("Stored metadata is invalid")
    }

    /// An empty document for a root.
    pub fn empty_document(&self, folder_id: &str, root_path: &str) -> FolderMetadata {
        FolderMetadata::new(FolderId::from(folder_id), root_path)
    }

    /// A document with `files` integrated entries and `dropped` pending drop entries.
    pub fn document_with(
        &self,
        folder_id: &str,
        root_path: &str,
        files: usize,
        dropped: usize,
    ) -> FolderMetadata {
        let mut document = self.empty_document(folder_id, root_path);
        for i in 0..files {
            document
                .add_file(self.file_entry(&format!("file-{i}.txt")))
                .expect("Failed to add file");
        }
        for i in 0..dropped {
            document
                .add_dropped(self.drop_entry(&self.key, &format!("drop-{i}.txt")))
                .expect("Failed to add drop entry");
        }
        document
    }

    pub fn file_entry(&self, name: &str) -> FileEntry {
        FileEntry::new(
            &self.key,
            format!("enc-{name}"),
            name,
            "text/plain",
            42,
            "aXY=",
            "dGFn",
            &[7u8; 16],
        )
        .expect("Failed to build file entry")
    }

    /// A drop entry sealed under `key`.
    pub fn drop_entry(&self, key: &FolderKey, name: &str) -> DropEntry {
        let file = DroppedFile {
            encrypted_name: format!("enc-{name}"),
            original_name: name.to_string(),
            mime_type: "application/pdf".into(),
            size: 1024,
            key: "CQkJCQkJCQkJCQkJCQkJCQ==".into(),
            initialization_vector: "aXY=".into(),
            authentication_tag: "dGFn".into(),
        };
        DropEntry::seal(key, &file).expect("Failed to seal drop entry")
    }
}

/// A journal that answers lookups but fails every write.
#[derive(Debug)]
pub struct ReadOnlyJournal {
    inner: Arc<SqliteJournal>,
}

impl ReadOnlyJournal {
    pub fn new(inner: Arc<SqliteJournal>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SyncJournal for ReadOnlyJournal {
    async fn file_record(&self, path: &str) -> AppResult<Option<JournalRecord>> {
        self.inner.file_record(path).await
    }

    async fn root_e2e_folder_record(&self, path: &str) -> AppResult<Option<JournalRecord>> {
        self.inner.root_e2e_folder_record(path).await
    }

    async fn remote_path(&self, path: &str) -> AppResult<String> {
        self.inner.remote_path(path).await
    }

    async fn delete_file_record(&self, _path: &str, _is_directory: bool) -> AppResult<bool> {
        Err(AppError::database("journal is read-only"))
    }

    async fn commit(&self, _label: &str) -> AppResult<()> {
        Err(AppError::database("journal is read-only"))
    }
}
