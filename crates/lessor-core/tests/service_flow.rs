//! Service-level flows: field policy, staged approvals, lifecycle guards,
//! and the document-then-submit handoff, driven through the in-memory store.

use lessor_core::{
    CoreConfig, DocumentQueue, EventBus, LeaseService, LeaseStore, NotificationDispatcher,
};
use lessor_domain::{
    Actor, ApprovalAction, ApprovalStatus, DocumentTemplate, LeaseError, LeaseStatus,
    SigningMethod, TerminationData, UpdatePayload, UserId,
};
use lessor_test_utils::fixtures::{active_lease, date, draft_lease};
use lessor_test_utils::{
    MemoryLeaseStore, RecordingDocumentQueue, RecordingEventBus, RecordingNotifier,
    StaticDirectory,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Harness {
    store: Arc<MemoryLeaseStore>,
    notifier: Arc<RecordingNotifier>,
    events: Arc<RecordingEventBus>,
    documents: Arc<RecordingDocumentQueue>,
    service: LeaseService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryLeaseStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let events = Arc::new(RecordingEventBus::new());
    let documents = Arc::new(RecordingDocumentQueue::new());
    let store_port: Arc<dyn LeaseStore> = store.clone();
    let notifier_port: Arc<dyn NotificationDispatcher> = notifier.clone();
    let events_port: Arc<dyn EventBus> = events.clone();
    let documents_port: Arc<dyn DocumentQueue> = documents.clone();
    let service = LeaseService::new(
        store_port,
        notifier_port,
        events_port,
        documents_port,
        Arc::new(StaticDirectory::empty()),
        CoreConfig::new(),
    );
    Harness {
        store,
        notifier,
        events,
        documents,
        service,
    }
}

fn rent_update(cents: i64) -> UpdatePayload {
    UpdatePayload {
        monthly_rent_cents: Some(cents),
        ..Default::default()
    }
}

#[tokio::test]
async fn active_lease_rejects_signed_core_field_updates() {
    let h = harness();
    let lease = active_lease();
    h.store.seed(lease.clone());

    for payload in [
        rent_update(999_00),
        UpdatePayload {
            security_deposit_cents: Some(500_00),
            ..Default::default()
        },
        UpdatePayload {
            start_date: Some(date(2025, 3, 1)),
            ..Default::default()
        },
        UpdatePayload {
            end_date: Some(date(2026, 3, 1)),
            ..Default::default()
        },
    ] {
        let err = h
            .service
            .update_lease(
                lease.client_id,
                &lease.luid,
                payload,
                Actor::admin(UserId::new()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LeaseError::Validation(_)));
    }

    // record is byte-for-byte unchanged
    assert_eq!(h.store.get(lease.id).unwrap(), lease);
}

#[tokio::test]
async fn immutable_keys_are_rejected_by_name() {
    let h = harness();
    let lease = draft_lease();
    h.store.seed(lease.clone());

    let payload: UpdatePayload = serde_json::from_value(serde_json::json!({
        "internal_notes": "fine",
        "approval_status": "approved"
    }))
    .unwrap();

    let err = h
        .service
        .update_lease(
            lease.client_id,
            &lease.luid,
            payload,
            Actor::admin(UserId::new()),
        )
        .await
        .unwrap_err();

    match err {
        LeaseError::Validation(msg) => assert!(msg.contains("approval_status"), "{msg}"),
        other => panic!("expected validation error, got {other}"),
    }
    assert_eq!(h.store.get(lease.id).unwrap(), lease);
}

#[tokio::test]
async fn staff_rent_change_is_staged_then_applied_on_approval() {
    let h = harness();
    let lease = draft_lease();
    let staff_id = UserId::new();
    h.store.seed(lease.clone());

    let staged = h
        .service
        .update_lease(
            lease.client_id,
            &lease.luid,
            rent_update(2_000_00),
            Actor::staff(staff_id),
        )
        .await
        .unwrap();

    assert_eq!(staged.fees.monthly_rent_cents, lease.fees.monthly_rent_cents);
    assert_eq!(staged.approval_status, ApprovalStatus::Pending);
    assert!(staged.pending_changes.is_some());

    let approved = h
        .service
        .approve_lease(
            lease.client_id,
            &lease.luid,
            Actor::manager(UserId::new()),
            Some("looks right".into()),
        )
        .await
        .unwrap();

    assert_eq!(approved.fees.monthly_rent_cents, 2_000_00);
    assert_eq!(approved.pending_changes, None);
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    let approvals: Vec<_> = approved
        .approval_details
        .iter()
        .filter(|e| e.action == ApprovalAction::Approved)
        .collect();
    assert_eq!(approvals.len(), 1);

    // the requester hears about the decision
    let records = h.notifier.records();
    assert!(records
        .iter()
        .any(|r| r.kind == "approval_decision" && r.recipient == Some(staff_id)));
}

#[tokio::test]
async fn approval_requires_an_approver_role() {
    let h = harness();
    let lease = draft_lease();
    h.store.seed(lease.clone());

    let err = h
        .service
        .approve_lease(lease.client_id, &lease.luid, Actor::staff(UserId::new()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LeaseError::Forbidden(_)));
}

#[tokio::test]
async fn termination_with_move_out_before_termination_date_fails() {
    let h = harness();
    let lease = active_lease();
    h.store.seed(lease.clone());

    let err = h
        .service
        .terminate_lease(
            lease.client_id,
            &lease.luid,
            TerminationData {
                reason: "tenant relocating out of state".into(),
                termination_date: date(2025, 6, 1),
                move_out_date: Some(date(2025, 5, 1)),
            },
            Actor::manager(UserId::new()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LeaseError::Validation(_)));
    assert_eq!(h.store.get(lease.id).unwrap().status, LeaseStatus::Active);
}

#[tokio::test]
async fn submission_without_document_queues_generation_then_completes() {
    let h = harness();
    let mut lease = draft_lease();
    lease.signing_method = SigningMethod::Electronic;
    lease.esign_provider = Some("docuseal".into());
    h.store.seed(lease.clone());
    let actor = Actor::manager(UserId::new());

    let queued = h
        .service
        .submit_for_signature(lease.client_id, &lease.luid, actor)
        .await
        .unwrap();

    // no document yet: stays draft, generation queued with send-after set
    assert_eq!(queued.status, LeaseStatus::Draft);
    let requests = h.documents.requests();
    assert_eq!(requests.len(), 1);
    let (lease_id, template, context) = requests[0].clone();
    assert_eq!(lease_id, lease.id);
    assert_eq!(template, DocumentTemplate::StandardLease);
    assert!(context.send_after_generation);

    let ready = h
        .service
        .handle_document_ready(lease.id, "leases/l-1001.pdf".into(), template, context)
        .await
        .unwrap();

    assert_eq!(ready.status, LeaseStatus::PendingSignature);
    assert_eq!(ready.document.unwrap().file_key, "leases/l-1001.pdf");
    assert_eq!(h.events.emitted_named("document_ready").len(), 1);
}

#[tokio::test]
async fn only_draft_or_cancelled_leases_may_be_deleted() {
    let h = harness();
    let draft = draft_lease();
    let active = active_lease();
    h.store.seed(draft.clone());
    h.store.seed(active.clone());
    let actor = Actor::admin(UserId::new());

    let err = h
        .service
        .delete_lease(active.client_id, &active.luid, actor)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaseError::Validation(_)));

    h.service
        .delete_lease(draft.client_id, &draft.luid, actor)
        .await
        .unwrap();
    assert!(h.store.get(draft.id).unwrap().deleted);

    // soft-deleted records are invisible to subsequent loads
    let err = h
        .service
        .delete_lease(draft.client_id, &draft.luid, actor)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaseError::NotFound(_)));
}

#[tokio::test]
async fn notification_failures_never_fail_the_mutation() {
    let store = Arc::new(MemoryLeaseStore::new());
    let store_port: Arc<dyn LeaseStore> = store.clone();
    let service = LeaseService::new(
        store_port,
        Arc::new(RecordingNotifier::failing()),
        Arc::new(RecordingEventBus::new()),
        Arc::new(RecordingDocumentQueue::new()),
        Arc::new(StaticDirectory::empty()),
        CoreConfig::new(),
    );
    let mut lease = draft_lease();
    lease.approval_status = ApprovalStatus::Draft;
    store.seed(lease.clone());

    service
        .update_lease(
            lease.client_id,
            &lease.luid,
            rent_update(2_000_00),
            Actor::staff(UserId::new()),
        )
        .await
        .unwrap();

    let approved = service
        .approve_lease(lease.client_id, &lease.luid, Actor::admin(UserId::new()), None)
        .await
        .unwrap();
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert_eq!(approved.fees.monthly_rent_cents, 2_000_00);
}

#[tokio::test]
async fn create_validates_dates_and_fees() {
    let h = harness();
    let template = draft_lease();
    let mut form = lessor_core::LeaseForm {
        lease_number: "L-2001".into(),
        tenant: template.tenant.clone(),
        co_tenants: vec![],
        property: template.property.clone(),
        duration: lessor_domain::LeaseDuration::new(date(2025, 2, 1), date(2025, 1, 1)),
        fees: template.fees.clone(),
        renewal_options: template.renewal_options,
        pet_policy: None,
        utilities_included: vec![],
        legal_terms: None,
        signing_method: SigningMethod::Manual,
        esign_provider: None,
    };

    let err = h
        .service
        .create_lease(template.client_id, form.clone(), Actor::admin(UserId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaseError::Validation(_)));

    form.duration = lessor_domain::LeaseDuration::new(date(2025, 2, 1), date(2026, 1, 31));
    let created = h
        .service
        .create_lease(template.client_id, form, Actor::admin(UserId::new()))
        .await
        .unwrap();
    assert_eq!(created.status, LeaseStatus::Draft);
    assert_eq!(h.events.emitted_named("lease_created").len(), 1);
}
