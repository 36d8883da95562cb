//! Integration tests for the metadata coordinator.

mod helpers;

use vaultsync_core::error::E2eeError;
use vaultsync_core::events::{EventPayload, MetadataEvent};
use vaultsync_core::types::id::FolderId;
use vaultsync_propagator::LockLease;

use helpers::TestEnv;

#[tokio::test]
async fn test_flag_deleted_is_visible_after_refetch() {
    let env = TestEnv::new().await;
    let document = env.document_with("42", "shared", 1, 0);
    env.add_encrypted_root("shared", "42", &document).await;
    let folder_id = FolderId::from("42");

    let lock = env.coordinator.acquire_lock(&folder_id).await.unwrap();
    let mut fetched = env.coordinator.fetch_metadata(&lock, "shared").await.unwrap();
    assert!(!fetched.is_deleted());
    fetched.flag_deleted_set();
    env.coordinator.upload_and_release(lock, &fetched).await.unwrap();

    let lock = env.coordinator.acquire_lock(&folder_id).await.unwrap();
    let refetched = env.coordinator.fetch_metadata(&lock, "shared").await.unwrap();
    assert!(refetched.is_deleted());
    env.coordinator.unlock_folder(lock, true).await.unwrap();
}

#[tokio::test]
async fn test_second_lock_is_unavailable() {
    let env = TestEnv::new().await;
    env.add_encrypted_root("shared", "42", &env.empty_document("42", "shared")).await;
    let folder_id = FolderId::from("42");

    let lock = env.coordinator.acquire_lock(&folder_id).await.unwrap();
    assert_eq!(
        env.coordinator.acquire_lock(&folder_id).await.unwrap_err(),
        E2eeError::LockUnavailable {
            folder_id: "42".into()
        }
    );
    env.coordinator.unlock_folder(lock, true).await.unwrap();
}

#[tokio::test]
async fn test_fetch_missing_metadata_is_not_found() {
    let env = TestEnv::new().await;
    env.server.add_folder("42", None).await;

    let lock = env.coordinator.acquire_lock(&FolderId::from("42")).await.unwrap();
    let result = env.coordinator.fetch_metadata(&lock, "shared").await;
    assert!(matches!(result, Err(E2eeError::NotFound { .. })));
    env.coordinator.unlock_folder(lock, false).await.unwrap();
}

#[tokio::test]
async fn test_fetch_without_folder_key_is_invalid() {
    let env = TestEnv::new().await;
    env.add_encrypted_root("private", "9", &env.empty_document("9", "private")).await;

    let lock = env.coordinator.acquire_lock(&FolderId::from("9")).await.unwrap();
    let result = env.coordinator.fetch_metadata(&lock, "private").await;
    assert!(matches!(result, Err(E2eeError::MetadataInvalid { .. })));
    env.coordinator.unlock_folder(lock, false).await.unwrap();
}

#[tokio::test]
async fn test_upload_under_foreign_lock_is_refused() {
    let env = TestEnv::new().await;
    env.add_encrypted_root("shared", "42", &env.empty_document("42", "shared")).await;
    env.add_encrypted_root("team", "43", &env.empty_document("43", "team")).await;

    let lock = env.coordinator.acquire_lock(&FolderId::from("43")).await.unwrap();
    let result = env
        .coordinator
        .upload_metadata(&lock, &env.empty_document("42", "shared"))
        .await;
    assert!(matches!(result, Err(E2eeError::MetadataInvalid { .. })));
    assert_eq!(env.server.counts().await.put_metadata, 0);
    env.coordinator.unlock_folder(lock, true).await.unwrap();
}

#[tokio::test]
async fn test_release_of_adopted_lease_is_noop() {
    let env = TestEnv::new().await;
    env.add_encrypted_root("shared", "42", &env.empty_document("42", "shared")).await;

    let lock = env.coordinator.acquire_lock(&FolderId::from("42")).await.unwrap();
    env.coordinator
        .release(LockLease::Adopted(&lock), true)
        .await
        .unwrap();
    assert_eq!(env.server.counts().await.unlock, 0);

    env.coordinator
        .release(LockLease::Acquired(lock), true)
        .await
        .unwrap();
    assert_eq!(env.server.counts().await.unlock, 1);
}

#[tokio::test]
async fn test_sequence_publishes_metadata_events() {
    let env = TestEnv::new().await;
    env.add_encrypted_root("shared", "42", &env.document_with("42", "shared", 2, 1)).await;
    let mut rx = env.events.subscribe();

    let lock = env.coordinator.acquire_lock(&FolderId::from("42")).await.unwrap();
    let fetched = env.coordinator.fetch_metadata(&lock, "shared").await.unwrap();
    env.coordinator.upload_and_release(lock, &fetched).await.unwrap();

    let mut steps = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let EventPayload::Metadata(event) = event.payload {
            steps.push(event);
        }
    }
    assert_eq!(steps.len(), 4);
    assert!(matches!(
        steps[1],
        MetadataEvent::MetadataFetched {
            entries: 2,
            pending_drop: 1,
            ..
        }
    ));
    assert!(matches!(
        steps[3],
        MetadataEvent::FolderUnlocked { success: true, .. }
    ));
}
