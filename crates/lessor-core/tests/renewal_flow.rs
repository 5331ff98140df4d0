//! Renewal orchestration end to end: idempotency under the transactional
//! path and the no-transaction fallback, plus approval-request routing.

use chrono::{TimeZone, Utc};
use lessor_core::{CoreConfig, EventBus, LeaseService, NotificationDispatcher, RenewalOverrides};
use lessor_domain::{Actor, ApprovalStatus, LeaseError, LeaseStatus, UserId};
use lessor_test_utils::fixtures::active_lease;
use lessor_test_utils::{
    MemoryLeaseStore, RecordingDocumentQueue, RecordingEventBus, RecordingNotifier,
    StaticDirectory,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn wire(
    store: Arc<MemoryLeaseStore>,
    directory: StaticDirectory,
) -> (LeaseService, Arc<RecordingNotifier>, Arc<RecordingEventBus>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let events = Arc::new(RecordingEventBus::new());
    let notifier_port: Arc<dyn NotificationDispatcher> = notifier.clone();
    let events_port: Arc<dyn EventBus> = events.clone();
    let service = LeaseService::new(
        store,
        notifier_port,
        events_port,
        Arc::new(RecordingDocumentQueue::new()),
        Arc::new(directory),
        CoreConfig::new(),
    );
    (service, notifier, events)
}

fn renewal_count(store: &MemoryLeaseStore) -> usize {
    store.count_where(|l| l.previous_lease_id.is_some())
}

#[tokio::test]
async fn manager_renewal_is_approved_and_repeat_conflicts() {
    let store = Arc::new(MemoryLeaseStore::new());
    let (service, _, events) = wire(Arc::clone(&store), StaticDirectory::empty());
    let original = active_lease();
    store.seed(original.clone());
    let manager = Actor::manager(UserId::new());

    let renewal = service
        .renew_lease(
            original.client_id,
            &original.luid,
            RenewalOverrides::default(),
            manager,
        )
        .await
        .unwrap();

    assert_eq!(renewal.status, LeaseStatus::DraftRenewal);
    assert_eq!(renewal.approval_status, ApprovalStatus::Approved);
    assert_eq!(renewal.previous_lease_id, Some(original.id));
    assert_eq!(events.emitted_named("lease_renewed").len(), 1);

    let err = service
        .renew_lease(
            original.client_id,
            &original.luid,
            RenewalOverrides::default(),
            manager,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LeaseError::Conflict(_)));
    assert_eq!(renewal_count(&store), 1);
}

#[tokio::test]
async fn scheduled_renewal_is_idempotent() {
    let store = Arc::new(MemoryLeaseStore::new());
    let (service, _, _) = wire(Arc::clone(&store), StaticDirectory::empty());
    let original = active_lease();
    store.seed(original.clone());
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 0, 0).unwrap();

    let first = service
        .renew_lease_scheduled(original.client_id, &original.luid, now)
        .await
        .unwrap();
    let second = service
        .renew_lease_scheduled(original.client_id, &original.luid, now)
        .await
        .unwrap();

    assert_eq!(first.luid, second.luid);
    assert_eq!(renewal_count(&store), 1);
}

#[tokio::test]
async fn renewal_survives_a_store_without_transactions() {
    let store = Arc::new(MemoryLeaseStore::without_transactions());
    let (service, _, _) = wire(Arc::clone(&store), StaticDirectory::empty());
    let original = active_lease();
    store.seed(original.clone());
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 0, 0).unwrap();

    let first = service
        .renew_lease_scheduled(original.client_id, &original.luid, now)
        .await
        .unwrap();
    assert_eq!(first.status, LeaseStatus::DraftRenewal);

    // fallback path still sees the existing renewal on the second call
    let second = service
        .renew_lease_scheduled(original.client_id, &original.luid, now)
        .await
        .unwrap();
    assert_eq!(first.luid, second.luid);
    assert_eq!(renewal_count(&store), 1);
}

#[tokio::test]
async fn staff_renewal_routes_approval_to_the_supervisor() {
    let staff_id = UserId::new();
    let supervisor_id = UserId::new();
    let store = Arc::new(MemoryLeaseStore::new());
    let (service, notifier, _) = wire(
        Arc::clone(&store),
        StaticDirectory::with_supervisor(staff_id, supervisor_id),
    );
    let original = active_lease();
    store.seed(original.clone());

    let renewal = service
        .renew_lease(
            original.client_id,
            &original.luid,
            RenewalOverrides::default(),
            Actor::staff(staff_id),
        )
        .await
        .unwrap();

    assert_eq!(renewal.approval_status, ApprovalStatus::Pending);
    assert!(notifier
        .records()
        .iter()
        .any(|r| r.kind == "notification" && r.recipient == Some(supervisor_id)));
}

#[tokio::test]
async fn staff_without_supervisor_creates_but_notifies_nobody() {
    let store = Arc::new(MemoryLeaseStore::new());
    let (service, notifier, _) = wire(Arc::clone(&store), StaticDirectory::empty());
    let original = active_lease();
    store.seed(original.clone());

    let renewal = service
        .renew_lease(
            original.client_id,
            &original.luid,
            RenewalOverrides::default(),
            Actor::staff(UserId::new()),
        )
        .await
        .unwrap();

    assert_eq!(renewal.approval_status, ApprovalStatus::Pending);
    assert!(notifier.records().is_empty());
}

#[tokio::test]
async fn scheduled_renewal_pending_approval_notifies_the_creator() {
    let store = Arc::new(MemoryLeaseStore::new());
    let (service, notifier, _) = wire(Arc::clone(&store), StaticDirectory::empty());
    let mut original = active_lease();
    original.renewal_options.require_approval = true;
    let creator = original.created_by.user_id().unwrap();
    store.seed(original.clone());
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 0, 0).unwrap();

    let renewal = service
        .renew_lease_scheduled(original.client_id, &original.luid, now)
        .await
        .unwrap();

    assert_eq!(renewal.approval_status, ApprovalStatus::Pending);
    assert!(notifier
        .records()
        .iter()
        .any(|r| r.kind == "notification" && r.recipient == Some(creator)));
}

#[tokio::test]
async fn only_active_leases_can_be_renewed() {
    let store = Arc::new(MemoryLeaseStore::new());
    let (service, _, _) = wire(Arc::clone(&store), StaticDirectory::empty());
    let mut original = active_lease();
    original.status = LeaseStatus::Terminated;
    store.seed(original.clone());

    let err = service
        .renew_lease(
            original.client_id,
            &original.luid,
            RenewalOverrides::default(),
            Actor::manager(UserId::new()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LeaseError::Validation(_)));
    assert_eq!(renewal_count(&store), 0);
}
