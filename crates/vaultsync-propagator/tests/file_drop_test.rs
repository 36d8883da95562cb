//! Integration tests for file-drop migration.

mod helpers;

use vaultsync_client::CallCounts;
use vaultsync_core::error::E2eeError;
use vaultsync_core::types::id::FolderId;
use vaultsync_metadata::FolderKey;

use helpers::TestEnv;

#[tokio::test]
async fn test_shared_drop_is_migrated_in_one_sequence() {
    let env = TestEnv::new().await;
    let document = env.document_with("42", "shared", 0, 1);
    env.add_encrypted_root("shared", "42", &document).await;

    let report = env
        .migration
        .run(&FolderId::from("42"), "/shared")
        .await
        .unwrap();

    assert_eq!(report.migrated, 1);
    assert_eq!(
        env.server.counts().await,
        CallCounts {
            lock: 1,
            unlock: 1,
            get_metadata: 1,
            put_metadata: 1,
            delete: 0,
        }
    );
    assert!(!env.server.is_locked(&FolderId::from("42")).await);

    let refetched = env.stored_document("42", "shared").await;
    assert_eq!(refetched.files().len(), 1);
    assert!(!refetched.is_file_drop_present());
}

#[tokio::test]
async fn test_migration_merges_into_existing_entries() {
    let env = TestEnv::new().await;
    let document = env.document_with("42", "shared", 3, 2);
    env.add_encrypted_root("shared", "42", &document).await;

    let report = env.migration.run(&FolderId::from("42"), "shared").await.unwrap();

    assert_eq!(report.migrated, 2);
    let refetched = env.stored_document("42", "shared").await;
    assert_eq!(refetched.files().len(), 5);
    assert!(refetched.file_drop().is_empty());
    for entry in refetched.files().values() {
        assert!(entry.unwrap_file_key(&env.key).is_ok());
    }
    assert!(refetched.files().values().any(|e| e.original_name == "drop-1.txt"));
}

#[tokio::test]
async fn test_empty_drop_unlocks_without_upload() {
    let env = TestEnv::new().await;
    let document = env.document_with("42", "shared", 1, 0);
    env.add_encrypted_root("shared", "42", &document).await;

    let report = env.migration.run(&FolderId::from("42"), "shared").await.unwrap();

    assert_eq!(report.migrated, 0);
    assert_eq!(env.server.counts().await.put_metadata, 0);
    assert_eq!(env.server.unlocks().await, vec![(FolderId::from("42"), true)]);
}

#[tokio::test]
async fn test_undecryptable_drop_aborts_and_unlocks() {
    let env = TestEnv::new().await;
    let mut document = env.document_with("42", "shared", 0, 1);
    document
        .add_dropped(env.drop_entry(&FolderKey::generate(), "foreign.txt"))
        .unwrap();
    env.add_encrypted_root("shared", "42", &document).await;

    let result = env.migration.run(&FolderId::from("42"), "shared").await;

    assert!(matches!(result, Err(E2eeError::MetadataInvalid { .. })));
    assert_eq!(env.server.counts().await.put_metadata, 0);
    assert_eq!(env.server.unlocks().await, vec![(FolderId::from("42"), false)]);
    assert!(env.stored_document("42", "shared").await.is_file_drop_present());
}

#[tokio::test]
async fn test_rejected_upload_still_unlocks_once() {
    let env = TestEnv::new().await;
    let document = env.document_with("42", "shared", 0, 2);
    env.add_encrypted_root("shared", "42", &document).await;
    env.server.reject_uploads(423).await;

    let result = env.migration.run(&FolderId::from("42"), "shared").await;

    assert_eq!(result, Err(E2eeError::UploadRejected { status: 423 }));
    assert_eq!(env.server.unlocks().await, vec![(FolderId::from("42"), false)]);
}
