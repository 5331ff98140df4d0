//! Caller-facing lease service
//!
//! Wires the field mutation policy, approval ledger, and state machine over
//! the collaborator ports. Every synchronous operation surfaces its error
//! immediately and leaves no partial state; post-commit side effects
//! (events, notifications, document queueing) are best-effort and logged
//! only.

use crate::approval;
use crate::config::CoreConfig;
use crate::ports::{
    DocumentQueue, ESignatureGateway, EventBus, LeaseStore, NotificationDispatcher, SenderInfo,
    SignerInfo, StaffDirectory,
};
use crate::renewal::{RenewalOrchestrator, RenewalOverrides};
use crate::state_machine;
use chrono::{DateTime, Utc};
use lessor_domain::{
    Actor, ApprovalAction, ApprovalStatus, ClientId, CoTenant, DocumentContext, DocumentTemplate,
    ESignatureState, ESignatureStatus, GeneratedDocument, InvitationId, Lease, LeaseDuration,
    LeaseError, LeaseEvent, LeaseFees, LeaseId, LeaseStatus, Luid, PetPolicy, PropertyRef,
    RenewalOptions, SigningMethod, TenantParty, TerminationData, UpdatePayload, UserId,
};
use lessor_policy::{classify, Route};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creation form for a new lease
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseForm {
    pub lease_number: String,
    pub tenant: Option<TenantParty>,
    pub co_tenants: Vec<CoTenant>,
    pub property: PropertyRef,
    pub duration: LeaseDuration,
    pub fees: LeaseFees,
    pub renewal_options: RenewalOptions,
    pub pet_policy: Option<PetPolicy>,
    pub utilities_included: Vec<String>,
    pub legal_terms: Option<String>,
    pub signing_method: SigningMethod,
    pub esign_provider: Option<String>,
}

/// Outcome of a bulk approval operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Leases actually modified
    pub modified: usize,
}

/// The lease lifecycle service
pub struct LeaseService {
    store: Arc<dyn LeaseStore>,
    notifications: Arc<dyn NotificationDispatcher>,
    events: Arc<dyn EventBus>,
    documents: Arc<dyn DocumentQueue>,
    renewals: RenewalOrchestrator,
    config: CoreConfig,
}

impl LeaseService {
    /// Wire the service to its collaborators
    pub fn new(
        store: Arc<dyn LeaseStore>,
        notifications: Arc<dyn NotificationDispatcher>,
        events: Arc<dyn EventBus>,
        documents: Arc<dyn DocumentQueue>,
        directory: Arc<dyn StaffDirectory>,
        config: CoreConfig,
    ) -> Self {
        let renewals = RenewalOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&events),
            Arc::clone(&notifications),
            directory,
            config.clone(),
        );
        Self {
            store,
            notifications,
            events,
            documents,
            renewals,
            config,
        }
    }

    /// Create a new draft lease.
    ///
    /// # Errors
    /// `Validation` for inconsistent dates or fees.
    pub async fn create_lease(
        &self,
        client: ClientId,
        form: LeaseForm,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        validate_form(&form)?;
        let now = Utc::now();

        let mut lease = Lease {
            id: LeaseId::new(),
            luid: Luid::generate(),
            client_id: client,
            lease_number: form.lease_number,
            status: LeaseStatus::Draft,
            approval_status: ApprovalStatus::Draft,
            tenant: form.tenant,
            co_tenants: form.co_tenants,
            property: form.property,
            duration: form.duration,
            fees: form.fees,
            renewal_options: form.renewal_options,
            pet_policy: form.pet_policy,
            utilities_included: form.utilities_included,
            legal_terms: form.legal_terms,
            signing_method: form.signing_method,
            esign_provider: form.esign_provider,
            esignature: None,
            signatures: vec![],
            document: None,
            pending_changes: None,
            approval_details: vec![],
            previous_lease_id: None,
            auto_send_info: None,
            internal_notes: None,
            inspection_date: None,
            created_by: actor,
            last_modified_by: vec![],
            created_at: now,
            updated_at: now,
            deleted: false,
        };
        lease.touch(actor, "create", now);

        let inserted = self.store.insert(lease).await?;
        tracing::info!(luid = %inserted.luid, client = %client, "lease created");

        self.emit(LeaseEvent::Created {
            luid: inserted.luid.clone(),
            client_id: client,
        })
        .await;

        Ok(inserted)
    }

    /// Apply a partial update through the field mutation policy.
    ///
    /// Operational fields apply directly; high-impact fields are staged for
    /// approval (staff) or applied immediately (approval roles), superseding
    /// any foreign staged set with an audit entry and a best-effort
    /// notification to the superseded requester.
    pub async fn update_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        payload: UpdatePayload,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self.load(client, luid).await?;
        let now = Utc::now();

        let decision = classify(&payload, lease.status, &actor)?;

        decision.operational.apply_to(&mut lease);

        let mut superseded = None;
        if decision.has_high_impact() {
            match decision.route {
                Route::Stage => {
                    approval::stage_change(&mut lease, decision.high_impact, &actor, now)?;
                }
                Route::Direct => {
                    superseded =
                        approval::apply_direct(&mut lease, &decision.high_impact, &actor, now)?;
                }
            }
        }

        lease.touch(actor, "update", now);
        let updated = self.store.update(lease).await?;

        if let Some(holder) = superseded {
            if let Some(recipient) = holder.user_id() {
                if let Err(e) = self
                    .notifications
                    .create_notification(
                        recipient,
                        "Pending changes superseded",
                        &format!(
                            "Your staged changes on lease {} were superseded by {actor}",
                            updated.luid
                        ),
                    )
                    .await
                {
                    tracing::warn!(luid = %updated.luid, error = %e, "supersede notification failed");
                }
            }
        }

        Ok(updated)
    }

    /// Activate a lease (manual path).
    pub async fn activate_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self.load(client, luid).await?;
        state_machine::check_activation(&lease, false)?;

        let now = Utc::now();
        lease.status = LeaseStatus::Active;
        lease.touch(actor, "activate", now);
        let updated = self.store.update(lease).await?;
        tracing::info!(luid = %updated.luid, "lease activated");

        let event = LeaseEvent::Activated {
            luid: updated.luid.clone(),
            client_id: client,
            activated_at: now,
        };
        self.emit(event.clone()).await;
        self.notify_lifecycle(&updated, &event).await;

        Ok(updated)
    }

    /// Terminate an active lease.
    pub async fn terminate_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        data: TerminationData,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self.load(client, luid).await?;
        state_machine::check_termination(&lease, &data, &self.config)?;

        let now = Utc::now();
        lease.duration.termination_date = Some(data.termination_date);
        if let Some(move_out) = data.move_out_date {
            lease.duration.move_out_date = Some(move_out);
        }
        lease.status = LeaseStatus::Terminated;
        lease.touch(actor, "terminate", now);
        let updated = self.store.update(lease).await?;
        tracing::info!(luid = %updated.luid, date = %data.termination_date, "lease terminated");

        let event = LeaseEvent::Terminated {
            luid: updated.luid.clone(),
            client_id: client,
            termination_date: data.termination_date,
            reason: data.reason,
        };
        self.emit(event.clone()).await;
        self.notify_lifecycle(&updated, &event).await;

        Ok(updated)
    }

    /// Cancel a lease that has not yet become active.
    pub async fn cancel_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self.load(client, luid).await?;
        state_machine::check_cancellation(&lease)?;

        lease.status = LeaseStatus::Cancelled;
        lease.touch(actor, "cancel", Utc::now());
        let updated = self.store.update(lease).await?;

        self.emit(LeaseEvent::Cancelled {
            luid: updated.luid.clone(),
            client_id: client,
        })
        .await;

        Ok(updated)
    }

    /// Approve staged changes (or a pending renewal).
    pub async fn approve_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        actor: Actor,
        notes: Option<String>,
    ) -> Result<Lease, LeaseError> {
        self.require_approver(&actor)?;
        let mut lease = self.load(client, luid).await?;
        let requester = approval::approve(&mut lease, &actor, notes.clone(), Utc::now())?;
        let updated = self.store.update(lease).await?;
        self.notify_decision(&updated, requester, &actor, ApprovalAction::Approved, notes.as_deref())
            .await;
        Ok(updated)
    }

    /// Reject staged changes with a reason.
    pub async fn reject_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        actor: Actor,
        reason: String,
    ) -> Result<Lease, LeaseError> {
        self.require_approver(&actor)?;
        let mut lease = self.load(client, luid).await?;
        let requester = approval::reject(&mut lease, &actor, &reason, Utc::now())?;
        let updated = self.store.update(lease).await?;
        self.notify_decision(&updated, requester, &actor, ApprovalAction::Rejected, Some(&reason))
            .await;
        Ok(updated)
    }

    /// Approve every listed lease currently pending approval.
    pub async fn bulk_approve_leases(
        &self,
        client: ClientId,
        luids: &[Luid],
        actor: Actor,
        notes: Option<String>,
    ) -> Result<BatchResult, LeaseError> {
        self.require_approver(&actor)?;
        let pending = self.store.list_pending_approvals(client, luids).await?;
        let mut modified = 0;
        for mut lease in pending {
            let luid = lease.luid.clone();
            match approval::approve(&mut lease, &actor, notes.clone(), Utc::now()) {
                Ok(requester) => {
                    let updated = self.store.update(lease).await?;
                    self.notify_decision(
                        &updated,
                        requester,
                        &actor,
                        ApprovalAction::Approved,
                        notes.as_deref(),
                    )
                    .await;
                    modified += 1;
                }
                Err(e) => {
                    tracing::warn!(luid = %luid, error = %e, "bulk approve skipped lease");
                }
            }
        }
        Ok(BatchResult { modified })
    }

    /// Reject every listed lease currently pending approval.
    pub async fn bulk_reject_leases(
        &self,
        client: ClientId,
        luids: &[Luid],
        actor: Actor,
        reason: String,
    ) -> Result<BatchResult, LeaseError> {
        self.require_approver(&actor)?;
        if reason.trim().is_empty() {
            return Err(LeaseError::validation("a rejection reason is required"));
        }
        let pending = self.store.list_pending_approvals(client, luids).await?;
        let mut modified = 0;
        for mut lease in pending {
            let luid = lease.luid.clone();
            match approval::reject(&mut lease, &actor, &reason, Utc::now()) {
                Ok(requester) => {
                    let updated = self.store.update(lease).await?;
                    self.notify_decision(
                        &updated,
                        requester,
                        &actor,
                        ApprovalAction::Rejected,
                        Some(&reason),
                    )
                    .await;
                    modified += 1;
                }
                Err(e) => {
                    tracing::warn!(luid = %luid, error = %e, "bulk reject skipped lease");
                }
            }
        }
        Ok(BatchResult { modified })
    }

    /// Create a renewal of an active lease.
    pub async fn renew_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        overrides: RenewalOverrides,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        self.renewals
            .create_renewal(client, luid, overrides, actor, Utc::now())
            .await
    }

    /// Scheduled-call entry into the renewal orchestrator, with an explicit
    /// clock for the generation job.
    pub async fn renew_lease_scheduled(
        &self,
        client: ClientId,
        luid: &Luid,
        now: DateTime<Utc>,
    ) -> Result<Lease, LeaseError> {
        self.renewals
            .create_renewal(client, luid, RenewalOverrides::default(), Actor::System, now)
            .await
    }

    /// Submit a draft for e-signature. When the document is not yet
    /// generated the lease stays draft and generation is queued; the
    /// completion event finishes the submission.
    pub async fn submit_for_signature(
        &self,
        client: ClientId,
        luid: &Luid,
        actor: Actor,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self.load(client, luid).await?;
        let now = Utc::now();

        match state_machine::check_submission(&lease)? {
            state_machine::SubmitReadiness::Ready => {
                lease.status = LeaseStatus::PendingSignature;
                lease.touch(actor, "submit_for_signature", now);
                self.store.update(lease).await
            }
            state_machine::SubmitReadiness::AwaitingDocument => {
                let template = if lease.previous_lease_id.is_some() {
                    DocumentTemplate::RenewalLease
                } else {
                    DocumentTemplate::StandardLease
                };
                self.documents
                    .enqueue_pdf_generation(
                        lease.id,
                        template,
                        DocumentContext {
                            requested_by: actor,
                            send_after_generation: true,
                        },
                    )
                    .await?;
                tracing::info!(luid = %lease.luid, "document generation queued; lease stays draft");
                lease.touch(actor, "queue_document", now);
                self.store.update(lease).await
            }
        }
    }

    /// Completion callback for document generation, carrying the job-scoped
    /// context from the original request.
    pub async fn handle_document_ready(
        &self,
        lease_id: LeaseId,
        file_key: String,
        template: DocumentTemplate,
        context: DocumentContext,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self
            .store
            .find_by_id(lease_id)
            .await?
            .ok_or_else(|| LeaseError::NotFound(format!("lease record {lease_id}")))?;

        let now = Utc::now();
        lease.document = Some(GeneratedDocument {
            file_key: file_key.clone(),
            template,
            generated_at: now,
        });

        if context.send_after_generation
            && matches!(
                lease.status,
                LeaseStatus::Draft | LeaseStatus::DraftRenewal | LeaseStatus::ReadyForSignature
            )
            && lease.signing_method == SigningMethod::Electronic
        {
            lease.status = LeaseStatus::PendingSignature;
        }
        lease.touch(context.requested_by, "document_ready", now);
        let updated = self.store.update(lease).await?;

        self.emit(LeaseEvent::DocumentReady {
            lease_id,
            luid: updated.luid.clone(),
            file_key,
            context,
        })
        .await;

        Ok(updated)
    }

    /// Soft-delete a draft or cancelled lease.
    pub async fn delete_lease(
        &self,
        client: ClientId,
        luid: &Luid,
        actor: Actor,
    ) -> Result<(), LeaseError> {
        let mut lease = self.load(client, luid).await?;
        if !lease.can_delete() {
            return Err(LeaseError::validation(format!(
                "only draft or cancelled leases may be deleted; lease {} is {}",
                lease.luid, lease.status
            )));
        }
        lease.deleted = true;
        lease.touch(actor, "delete", Utc::now());
        self.store.update(lease).await?;
        Ok(())
    }

    /// Resolve a pending tenant invitation into a real user id.
    pub async fn resolve_invitation(
        &self,
        client: ClientId,
        luid: &Luid,
        invitation: InvitationId,
        user: UserId,
    ) -> Result<Lease, LeaseError> {
        let mut lease = self.load(client, luid).await?;
        lease.resolve_invitation(invitation, user)?;
        lease.touch(Actor::System, "resolve_invitation", Utc::now());
        self.store.update(lease).await
    }

    async fn load(&self, client: ClientId, luid: &Luid) -> Result<Lease, LeaseError> {
        self.store
            .find_by_luid(client, luid)
            .await?
            .filter(|l| !l.deleted)
            .ok_or_else(|| LeaseError::lease_not_found(luid))
    }

    fn require_approver(&self, actor: &Actor) -> Result<(), LeaseError> {
        if actor.can_approve() {
            Ok(())
        } else {
            Err(LeaseError::Forbidden(
                "approval decisions require a manager or admin role".into(),
            ))
        }
    }

    async fn emit(&self, event: LeaseEvent) {
        if let Err(e) = self.events.emit(event.clone()).await {
            tracing::warn!(event = event.name(), error = %e, "event emission failed");
        }
    }

    async fn notify_lifecycle(&self, lease: &Lease, event: &LeaseEvent) {
        if let Err(e) = self
            .notifications
            .notify_lease_lifecycle_event(lease, event)
            .await
        {
            tracing::warn!(luid = %lease.luid, error = %e, "lifecycle notification failed");
        }
    }

    async fn notify_decision(
        &self,
        lease: &Lease,
        requester: Option<Actor>,
        decider: &Actor,
        decision: ApprovalAction,
        notes: Option<&str>,
    ) {
        let Some(requester) = requester else { return };
        if requester.same_identity(decider) {
            return;
        }
        let Some(recipient) = requester.user_id() else {
            return;
        };
        if let Err(e) = self
            .notifications
            .notify_approval_decision(recipient, lease, decision, notes)
            .await
        {
            tracing::warn!(luid = %lease.luid, error = %e, "decision notification failed");
        }
    }
}

/// Send a signature-ready lease to the e-signature provider and record the
/// envelope. Shared by the manual path and the auto-send dispatch job.
///
/// # Errors
/// `Validation` when the lease has no provider or no tenant to sign;
/// `ExternalService` when the gateway call fails.
pub async fn send_lease_for_signature(
    lease: &mut Lease,
    gateway: &dyn ESignatureGateway,
    sender: &SenderInfo,
    now: DateTime<Utc>,
) -> Result<(), LeaseError> {
    let provider = lease
        .esign_provider
        .clone()
        .ok_or_else(|| LeaseError::validation("no e-signature provider configured"))?;

    let mut signers = Vec::with_capacity(1 + lease.co_tenants.len());
    let tenant = lease
        .tenant
        .as_ref()
        .ok_or_else(|| LeaseError::validation("lease has no tenant to sign"))?;
    signers.push(SignerInfo {
        name: tenant.name.clone(),
        email: tenant.email.clone(),
    });
    for co_tenant in &lease.co_tenants {
        signers.push(SignerInfo {
            name: co_tenant.name.clone(),
            email: co_tenant.email.clone(),
        });
    }

    let envelope_id = gateway.send_for_signature(lease, &signers, sender).await?;

    lease.esignature = Some(ESignatureState {
        provider,
        envelope_id,
        status: ESignatureStatus::Sent,
        sent_at: Some(now),
        completed_at: None,
        error_message: None,
    });
    lease.status = LeaseStatus::PendingSignature;
    tracing::info!(luid = %lease.luid, "lease sent for signature");
    Ok(())
}

fn validate_form(form: &LeaseForm) -> Result<(), LeaseError> {
    if form.duration.start_date >= form.duration.end_date {
        return Err(LeaseError::validation(
            "lease start date must precede its end date",
        ));
    }
    if form.fees.monthly_rent_cents < 0 || form.fees.security_deposit_cents < 0 {
        return Err(LeaseError::validation("fee amounts must be non-negative"));
    }
    if !(1..=31).contains(&form.fees.rent_due_day) {
        return Err(LeaseError::validation("rent due day must be within 1..=31"));
    }
    Ok(())
}
