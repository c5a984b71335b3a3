//! Ownership and access-control tests.
//!
//! Verifies that every operation is scoped to the task owner, that each
//! rejection leaves state untouched, and that system-terminal status
//! reports -- which carry no end-user identity -- bypass the ownership
//! check while everything else stays owner-gated.

use std::sync::Arc;

use gateway_tasks::store::memory::InMemoryStore;
use gateway_tasks::store::DurableStore;
use gateway_tasks::{TaskError, TaskService, TaskStatus, TaskSummary};

async fn service_with_store() -> (TaskService<Arc<InMemoryStore>>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let service = TaskService::bootstrap(Arc::clone(&store)).await.unwrap();
    (service, store)
}

async fn alice_task(service: &TaskService<Arc<InMemoryStore>>) -> TaskSummary {
    service.create_task("alice", "storage").await.unwrap()
}

// ─── Ownership on every operation ───────────────────────────────────────────

#[tokio::test]
async fn non_owner_cannot_read() {
    let (service, _store) = service_with_store().await;
    let task = alice_task(&service).await;

    let result = service.get_task(&task.task_id, "bob").await;
    assert!(matches!(result, Err(TaskError::OwnerMismatch { .. })));
}

#[tokio::test]
async fn non_owner_cannot_update_ordinary_status() {
    let (service, store) = service_with_store().await;
    let task = alice_task(&service).await;

    let result = service
        .update_task_status(&task.task_id, Some("bob"), "running", None)
        .await;
    assert!(matches!(result, Err(TaskError::OwnerMismatch { .. })));

    // No mutation anywhere.
    let fetched = service.get_task(&task.task_id, "alice").await.unwrap();
    assert_eq!(fetched.status, TaskStatus::Queued);
    let stored = store
        .load(task.task_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TaskStatus::Queued);
}

#[tokio::test]
async fn non_owner_cannot_delete() {
    let (service, store) = service_with_store().await;
    let task = alice_task(&service).await;

    let result = service.delete_task(&task.task_id, "bob").await;
    assert!(matches!(result, Err(TaskError::OwnerMismatch { .. })));

    // Task still live, durable record still present.
    let fetched = service.get_task(&task.task_id, "alice").await.unwrap();
    assert_eq!(fetched.status, TaskStatus::Queued);
    assert!(store
        .load(task.task_id.parse().unwrap())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn non_owner_cannot_set_expiry() {
    let (service, store) = service_with_store().await;
    let task = alice_task(&service).await;

    let result = service.set_task_expiry(&task.task_id, "bob", Some(0)).await;
    assert!(matches!(result, Err(TaskError::OwnerMismatch { .. })));

    // No TTL was applied.
    assert!(store
        .load(task.task_id.parse().unwrap())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn non_owner_listing_sees_nothing() {
    let (service, _store) = service_with_store().await;
    alice_task(&service).await;

    let listing = service.list_tasks_for_owner("bob").await.unwrap();
    assert!(listing.is_empty());
}

// ─── Identity requirements ──────────────────────────────────────────────────

#[tokio::test]
async fn ordinary_update_without_identity_is_unauthenticated() {
    let (service, _store) = service_with_store().await;
    let task = alice_task(&service).await;

    let result = service
        .update_task_status(&task.task_id, None, "running", None)
        .await;
    assert!(matches!(result, Err(TaskError::Unauthenticated { .. })));

    let fetched = service.get_task(&task.task_id, "alice").await.unwrap();
    assert_eq!(fetched.status, TaskStatus::Queued);
}

#[tokio::test]
async fn empty_identity_is_rejected_everywhere() {
    let (service, _store) = service_with_store().await;
    let task = alice_task(&service).await;

    assert!(matches!(
        service.list_tasks_for_owner("").await,
        Err(TaskError::Unauthenticated { .. })
    ));
    assert!(matches!(
        service.delete_task(&task.task_id, "").await,
        Err(TaskError::Unauthenticated { .. })
    ));
    assert!(matches!(
        service.set_task_expiry(&task.task_id, "", None).await,
        Err(TaskError::Unauthenticated { .. })
    ));
}

// ─── System-terminal exemption ──────────────────────────────────────────────

#[tokio::test]
async fn system_terminal_update_needs_no_identity() {
    let (service, store) = service_with_store().await;
    let task = alice_task(&service).await;

    for code in [
        "download_finished",
        "download_error",
        "upload_finished",
        "upload_error",
    ] {
        let updated = service
            .update_task_status(&task.task_id, None, code, None)
            .await
            .unwrap();
        assert_eq!(updated.status.code(), code);
    }

    let stored = store
        .load(task.task_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TaskStatus::UploadError);
}

#[tokio::test]
async fn system_terminal_update_ignores_a_mismatched_identity() {
    // A worker that happens to forward some identity is still exempt: the
    // check is skipped entirely for these codes.
    let (service, _store) = service_with_store().await;
    let task = alice_task(&service).await;

    let updated = service
        .update_task_status(&task.task_id, Some("bob"), "upload_finished", None)
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::UploadFinished);
}

#[tokio::test]
async fn system_terminal_update_applies_canonical_message() {
    let (service, _store) = service_with_store().await;
    let task = alice_task(&service).await;

    let updated = service
        .update_task_status(&task.task_id, None, "download_error", None)
        .await
        .unwrap();
    assert_eq!(
        updated.description,
        TaskStatus::DownloadError.default_message()
    );
}

// ─── Service recognition ────────────────────────────────────────────────────

#[tokio::test]
async fn create_from_unrecognized_service_is_rejected() {
    let (service, store) = service_with_store().await;

    let result = service.create_task("alice", "frontend").await;
    assert!(
        matches!(result, Err(TaskError::UnknownService { service }) if service == "frontend")
    );
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn access_and_validation_rejections_are_not_retryable() {
    let (service, _store) = service_with_store().await;
    let task = alice_task(&service).await;

    let err = service.get_task(&task.task_id, "bob").await.unwrap_err();
    assert!(!err.is_retryable());

    let err = service
        .update_task_status(&task.task_id, Some("alice"), "nope", None)
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
}
