//! Collaborator ports
//!
//! Narrow interfaces over everything the core consumes but does not own:
//! persistence, notifications, event propagation, the e-signature provider,
//! the document-generation queue, and the staff directory. All side-channel
//! ports (notifications, events) are best-effort: callers log failures and
//! never roll back a committed mutation because of them.

use async_trait::async_trait;
use lessor_domain::{
    ApprovalAction, ClientId, DocumentContext, DocumentTemplate, Lease, LeaseError, LeaseEvent,
    LeaseId, Luid, UserId,
};
use serde::{Deserialize, Serialize};

/// A signer the e-signature provider should collect from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    pub name: String,
    pub email: String,
}

/// Sender identity stamped onto outbound envelopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub name: String,
    pub email: String,
}

/// Transactional session over the lease record store.
///
/// The read-check-write sequence for "does an open renewal already exist"
/// must be atomic with the insert; this session is the only mechanism
/// providing that.
#[async_trait]
pub trait LeaseTxn: Send {
    /// Open (non-terminal) renewal keyed by `previous_lease_id`, if any
    async fn find_open_renewal_of(
        &mut self,
        previous: LeaseId,
    ) -> Result<Option<Lease>, LeaseError>;

    /// Stage an insert
    async fn insert(&mut self, lease: Lease) -> Result<Lease, LeaseError>;

    /// Stage an update
    async fn update(&mut self, lease: Lease) -> Result<Lease, LeaseError>;

    /// Commit everything staged in this session
    async fn commit(self: Box<Self>) -> Result<(), LeaseError>;
}

/// Lease record store. Implementations scope every query by client and
/// exclude soft-deleted records unless stated otherwise.
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Lease by external id within a client scope
    async fn find_by_luid(
        &self,
        client: ClientId,
        luid: &Luid,
    ) -> Result<Option<Lease>, LeaseError>;

    /// Lease by internal key
    async fn find_by_id(&self, id: LeaseId) -> Result<Option<Lease>, LeaseError>;

    /// Lease holding this e-signature envelope
    async fn find_by_envelope(&self, envelope_id: &str) -> Result<Option<Lease>, LeaseError>;

    /// Open (non-terminal) renewal keyed by `previous_lease_id`, if any
    async fn find_open_renewal_of(&self, previous: LeaseId)
        -> Result<Option<Lease>, LeaseError>;

    /// Active leases with auto-renew enabled and a generation threshold set
    async fn list_renewal_candidates(&self) -> Result<Vec<Lease>, LeaseError>;

    /// Approved, signature-ready renewals awaiting dispatch
    async fn list_dispatch_candidates(&self) -> Result<Vec<Lease>, LeaseError>;

    /// Subset of the given leases currently pending approval
    async fn list_pending_approvals(
        &self,
        client: ClientId,
        luids: &[Luid],
    ) -> Result<Vec<Lease>, LeaseError>;

    /// Insert a new lease record
    async fn insert(&self, lease: Lease) -> Result<Lease, LeaseError>;

    /// Persist an updated lease record
    async fn update(&self, lease: Lease) -> Result<Lease, LeaseError>;

    /// Open a transactional session.
    ///
    /// # Errors
    /// [`lessor_domain::StoreError::TransactionsUnsupported`] when this
    /// deployment cannot open transactions; callers retry once without one.
    async fn begin(&self) -> Result<Box<dyn LeaseTxn + '_>, LeaseError>;
}

/// Best-effort human notification channel; failures are logged only
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Free-form notification to one recipient
    async fn create_notification(
        &self,
        recipient: UserId,
        subject: &str,
        body: &str,
    ) -> Result<(), LeaseError>;

    /// Approval decision outcome to the original requester
    async fn notify_approval_decision(
        &self,
        recipient: UserId,
        lease: &Lease,
        decision: ApprovalAction,
        notes: Option<&str>,
    ) -> Result<(), LeaseError>;

    /// Lifecycle change fan-out (activation, termination, renewal)
    async fn notify_lease_lifecycle_event(
        &self,
        lease: &Lease,
        event: &LeaseEvent,
    ) -> Result<(), LeaseError>;

    /// Administrator-facing failure report from scheduled jobs
    async fn notify_system_error(&self, context: &str, error: &LeaseError)
        -> Result<(), LeaseError>;
}

/// Typed event bus for cross-module propagation
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Emit one event to all subscribers
    async fn emit(&self, event: LeaseEvent) -> Result<(), LeaseError>;
}

/// Outbound e-signature provider gateway
#[async_trait]
pub trait ESignatureGateway: Send + Sync {
    /// Send the lease out for signature; returns the provider envelope id
    async fn send_for_signature(
        &self,
        lease: &Lease,
        signers: &[SignerInfo],
        sender: &SenderInfo,
    ) -> Result<String, LeaseError>;

    /// Void an outstanding envelope
    async fn revoke_document(&self, envelope_id: &str, reason: &str) -> Result<(), LeaseError>;
}

/// Asynchronous PDF generation; completion arrives as a
/// [`LeaseEvent::DocumentReady`] event, not a return value.
#[async_trait]
pub trait DocumentQueue: Send + Sync {
    /// Enqueue rendering of the lease document
    async fn enqueue_pdf_generation(
        &self,
        lease_id: LeaseId,
        template: DocumentTemplate,
        context: DocumentContext,
    ) -> Result<(), LeaseError>;
}

/// Organization directory lookup for approval routing
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Supervisor of the given staff member, when one is assigned
    async fn supervisor_of(&self, user: UserId) -> Result<Option<UserId>, LeaseError>;
}
