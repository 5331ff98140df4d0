//! Webhook-to-lease reconciliation
//!
//! Each webhook names an envelope; the lease holding that envelope is the
//! only record touched. Envelope status events rewrite the e-signature
//! mirror and, where the provider outcome ends the signing round, put the
//! lease back into draft. A completed envelope activates the lease under the
//! same guards and with the same downstream side effects as manual
//! activation.

use crate::event::{ProviderEvent, WebhookPayload};
use chrono::{DateTime, Utc};
use lessor_core::{check_activation, EventBus, LeaseStore, NotificationDispatcher};
use lessor_domain::{
    Actor, ESignatureStatus, Lease, LeaseError, LeaseEvent, LeaseStatus, SignatureEntry,
    SignatureMethod, SignerIdentity, SignerRole, TenantRef,
};
use std::sync::Arc;

/// Applies provider webhooks to the lease record
pub struct Reconciler {
    store: Arc<dyn LeaseStore>,
    events: Arc<dyn EventBus>,
    notifications: Arc<dyn NotificationDispatcher>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        events: Arc<dyn EventBus>,
        notifications: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            events,
            notifications,
        }
    }

    /// Apply one webhook delivery. Returns the updated lease, or `None`
    /// when the event type is unrecognized (logged and ignored).
    ///
    /// # Errors
    /// `NotFound` when no lease holds the envelope; `Validation` when a
    /// per-signer event cannot be matched to a lease party or when a
    /// `Completed` envelope belongs to a lease that fails the activation
    /// guards; `Conflict` when `Completed` arrives for an already-active
    /// lease. Deliveries are at-least-once, so duplicate `Signed` events
    /// succeed without a second ledger entry.
    pub async fn handle_webhook(
        &self,
        event_type: &str,
        envelope_id: &str,
        payload: WebhookPayload,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, LeaseError> {
        let event: ProviderEvent = match event_type.parse() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(envelope_id, error = %e, "ignoring unrecognized webhook");
                return Ok(None);
            }
        };

        let mut lease = self
            .store
            .find_by_envelope(envelope_id)
            .await?
            .ok_or_else(|| LeaseError::NotFound(format!("envelope {envelope_id}")))?;

        match event {
            ProviderEvent::SendFailed => {
                set_envelope_status(&mut lease, ESignatureStatus::Voided)?;
                lease.status = LeaseStatus::Draft;
            }
            ProviderEvent::Declined => {
                set_envelope_status(&mut lease, ESignatureStatus::Declined)?;
                lease.status = LeaseStatus::Draft;
            }
            ProviderEvent::Expired => {
                set_envelope_status(&mut lease, ESignatureStatus::Voided)?;
                lease.status = LeaseStatus::Draft;
            }
            ProviderEvent::Revoked => {
                set_envelope_status(&mut lease, ESignatureStatus::Draft)?;
                lease.status = LeaseStatus::Draft;
            }
            ProviderEvent::Signed => {
                let entry = resolve_signer(&lease, &payload, now)?;
                if !lease.append_signature(entry) {
                    tracing::debug!(
                        luid = %lease.luid,
                        envelope_id,
                        "duplicate signed delivery ignored"
                    );
                    return Ok(Some(lease));
                }
            }
            ProviderEvent::Completed => {
                // Same gate as manual activation: approved, date-consistent,
                // and at least one collected signature. Also rejects replays
                // of an envelope whose lease is already active.
                check_activation(&lease, true)?;
                set_envelope_status(&mut lease, ESignatureStatus::Completed)?;
                if let Some(esign) = lease.esignature.as_mut() {
                    esign.completed_at = Some(now);
                }
                lease.status = LeaseStatus::Active;
            }
        }

        lease.touch(Actor::System, webhook_action(event), now);
        let updated = self.store.update(lease).await?;
        tracing::info!(
            luid = %updated.luid,
            envelope_id,
            event = ?event,
            status = %updated.status,
            "webhook reconciled"
        );

        if event == ProviderEvent::Completed {
            self.emit(LeaseEvent::SignatureCompleted {
                luid: updated.luid.clone(),
                envelope_id: envelope_id.to_string(),
            })
            .await;
            let activated = LeaseEvent::Activated {
                luid: updated.luid.clone(),
                client_id: updated.client_id,
                activated_at: now,
            };
            self.emit(activated.clone()).await;
            if let Err(e) = self
                .notifications
                .notify_lease_lifecycle_event(&updated, &activated)
                .await
            {
                tracing::warn!(luid = %updated.luid, error = %e, "lifecycle notification failed");
            }
        }

        Ok(Some(updated))
    }

    async fn emit(&self, event: LeaseEvent) {
        if let Err(e) = self.events.emit(event.clone()).await {
            tracing::warn!(event = event.name(), error = %e, "event emission failed");
        }
    }
}

fn webhook_action(event: ProviderEvent) -> &'static str {
    match event {
        ProviderEvent::SendFailed => "esign_send_failed",
        ProviderEvent::Completed => "esign_completed",
        ProviderEvent::Declined => "esign_declined",
        ProviderEvent::Expired => "esign_expired",
        ProviderEvent::Revoked => "esign_revoked",
        ProviderEvent::Signed => "esign_signed",
    }
}

fn set_envelope_status(lease: &mut Lease, status: ESignatureStatus) -> Result<(), LeaseError> {
    let esign = lease.esignature.as_mut().ok_or_else(|| {
        LeaseError::validation(format!(
            "lease {} has no e-signature envelope to reconcile",
            lease.luid
        ))
    })?;
    esign.status = status;
    Ok(())
}

/// Match the signer email against the lease parties in priority order:
/// tenant, co-tenants, property manager.
fn resolve_signer(
    lease: &Lease,
    payload: &WebhookPayload,
    now: DateTime<Utc>,
) -> Result<SignatureEntry, LeaseError> {
    let email = payload
        .signer_email
        .as_deref()
        .ok_or_else(|| LeaseError::validation("signed event carries no signer email"))?;
    let signed_at = payload.signed_at.unwrap_or(now);

    let (role, signer) = if let Some(tenant) = lease
        .tenant
        .as_ref()
        .filter(|t| t.email.eq_ignore_ascii_case(email))
    {
        let signer = match tenant.reference {
            TenantRef::ExistingUser(user) => SignerIdentity::User(user),
            TenantRef::PendingInvitation(_) => SignerIdentity::Email(tenant.email.clone()),
        };
        (SignerRole::Tenant, signer)
    } else if let Some(co_tenant) = lease
        .co_tenants
        .iter()
        .find(|c| c.email.eq_ignore_ascii_case(email))
    {
        let signer = match co_tenant.user_id {
            Some(user) => SignerIdentity::User(user),
            None => SignerIdentity::Email(co_tenant.email.clone()),
        };
        (SignerRole::CoTenant, signer)
    } else if lease
        .property
        .manager_email
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case(email))
    {
        let signer = match lease.property.manager_user_id {
            Some(user) => SignerIdentity::User(user),
            None => SignerIdentity::Email(email.to_string()),
        };
        (SignerRole::PropertyManager, signer)
    } else {
        return Err(LeaseError::validation(format!(
            "signer {email} does not match any party on lease {}",
            lease.luid
        )));
    };

    Ok(SignatureEntry {
        role,
        signer,
        method: SignatureMethod::Electronic,
        signed_at,
    })
}
