//! Recording doubles for the collaborator ports

use async_trait::async_trait;
use lessor_core::{
    DocumentQueue, ESignatureGateway, EventBus, NotificationDispatcher, SenderInfo, SignerInfo,
    StaffDirectory,
};
use lessor_domain::{
    ApprovalAction, DocumentContext, DocumentTemplate, Lease, LeaseError, LeaseEvent, LeaseId,
    Luid, UserId,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Event bus that records every emission
#[derive(Debug, Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<LeaseEvent>>,
}

impl RecordingEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event emitted so far
    #[must_use]
    pub fn emitted(&self) -> Vec<LeaseEvent> {
        self.events.lock().clone()
    }

    /// Events of one name
    #[must_use]
    pub fn emitted_named(&self, name: &str) -> Vec<LeaseEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn emit(&self, event: LeaseEvent) -> Result<(), LeaseError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub kind: String,
    pub recipient: Option<UserId>,
    pub detail: String,
}

/// Notifier that records every call; optionally fails every call to prove
/// notification failures never fail a mutation
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<NotificationRecord>>,
    fail: bool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier whose every call errors
    #[must_use]
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().clone()
    }

    fn record(
        &self,
        kind: &str,
        recipient: Option<UserId>,
        detail: String,
    ) -> Result<(), LeaseError> {
        self.records.lock().push(NotificationRecord {
            kind: kind.to_string(),
            recipient,
            detail,
        });
        if self.fail {
            Err(LeaseError::ExternalService(
                "notification channel unavailable".into(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn create_notification(
        &self,
        recipient: UserId,
        subject: &str,
        body: &str,
    ) -> Result<(), LeaseError> {
        self.record("notification", Some(recipient), format!("{subject}: {body}"))
    }

    async fn notify_approval_decision(
        &self,
        recipient: UserId,
        lease: &Lease,
        decision: ApprovalAction,
        notes: Option<&str>,
    ) -> Result<(), LeaseError> {
        self.record(
            "approval_decision",
            Some(recipient),
            format!("{} {:?} {}", lease.luid, decision, notes.unwrap_or("")),
        )
    }

    async fn notify_lease_lifecycle_event(
        &self,
        lease: &Lease,
        event: &LeaseEvent,
    ) -> Result<(), LeaseError> {
        self.record("lifecycle", None, format!("{} {}", lease.luid, event.name()))
    }

    async fn notify_system_error(
        &self,
        context: &str,
        error: &LeaseError,
    ) -> Result<(), LeaseError> {
        self.record("system_error", None, format!("{context}: {error}"))
    }
}

/// One envelope sent through the stub gateway
#[derive(Debug, Clone)]
pub struct SentEnvelope {
    pub luid: Luid,
    pub envelope_id: String,
    pub signers: Vec<SignerInfo>,
    pub sender: SenderInfo,
}

/// Gateway that hands out sequential envelope ids, or fails on demand
#[derive(Debug, Default)]
pub struct StubGateway {
    sent: Mutex<Vec<SentEnvelope>>,
    revoked: Mutex<Vec<(String, String)>>,
    counter: AtomicUsize,
    fail: bool,
}

impl StubGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway whose send calls error
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sent(&self) -> Vec<SentEnvelope> {
        self.sent.lock().clone()
    }

    #[must_use]
    pub fn revoked(&self) -> Vec<(String, String)> {
        self.revoked.lock().clone()
    }
}

#[async_trait]
impl ESignatureGateway for StubGateway {
    async fn send_for_signature(
        &self,
        lease: &Lease,
        signers: &[SignerInfo],
        sender: &SenderInfo,
    ) -> Result<String, LeaseError> {
        if self.fail {
            return Err(LeaseError::ExternalService("provider rejected envelope".into()));
        }
        let envelope_id = format!("env-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        self.sent.lock().push(SentEnvelope {
            luid: lease.luid.clone(),
            envelope_id: envelope_id.clone(),
            signers: signers.to_vec(),
            sender: sender.clone(),
        });
        Ok(envelope_id)
    }

    async fn revoke_document(&self, envelope_id: &str, reason: &str) -> Result<(), LeaseError> {
        self.revoked
            .lock()
            .push((envelope_id.to_string(), reason.to_string()));
        Ok(())
    }
}

/// Document queue that records requests without generating anything
#[derive(Debug, Default)]
pub struct RecordingDocumentQueue {
    requests: Mutex<Vec<(LeaseId, DocumentTemplate, DocumentContext)>>,
}

impl RecordingDocumentQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<(LeaseId, DocumentTemplate, DocumentContext)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DocumentQueue for RecordingDocumentQueue {
    async fn enqueue_pdf_generation(
        &self,
        lease_id: LeaseId,
        template: DocumentTemplate,
        context: DocumentContext,
    ) -> Result<(), LeaseError> {
        self.requests.lock().push((lease_id, template, context));
        Ok(())
    }
}

/// Fixed supervisor mapping
#[derive(Debug, Default)]
pub struct StaticDirectory {
    supervisors: HashMap<UserId, UserId>,
}

impl StaticDirectory {
    /// Directory where nobody has a supervisor
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Directory with one supervisor assignment
    #[must_use]
    pub fn with_supervisor(staff: UserId, supervisor: UserId) -> Self {
        let mut supervisors = HashMap::new();
        supervisors.insert(staff, supervisor);
        Self { supervisors }
    }
}

#[async_trait]
impl StaffDirectory for StaticDirectory {
    async fn supervisor_of(&self, user: UserId) -> Result<Option<UserId>, LeaseError> {
        Ok(self.supervisors.get(&user).copied())
    }
}
