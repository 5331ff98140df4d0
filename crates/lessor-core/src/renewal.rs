//! Renewal orchestrator
//!
//! Derives a draft renewal from an active lease under transactional
//! idempotency: the existing-renewal check and the insert happen inside one
//! store session, which is the only guard against duplicate renewals under
//! concurrent scheduled-and-manual invocation (best-effort, not a schema
//! constraint). Post-commit side effects are best-effort.

use crate::config::CoreConfig;
use crate::ports::{EventBus, LeaseStore, NotificationDispatcher, StaffDirectory};
use chrono::{DateTime, Months, NaiveDate, Utc};
use lessor_domain::{
    Actor, ActorRole, ApprovalStatus, ClientId, Lease, LeaseError, LeaseEvent, LeaseId,
    LeaseStatus, Luid, StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Caller-supplied overrides for a renewal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RenewalOverrides {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub monthly_rent_cents: Option<i64>,
    pub security_deposit_cents: Option<i64>,
    pub renewal_term_months: Option<u32>,
}

/// Creates renewals from active leases
pub struct RenewalOrchestrator {
    store: Arc<dyn LeaseStore>,
    events: Arc<dyn EventBus>,
    notifications: Arc<dyn NotificationDispatcher>,
    directory: Arc<dyn StaffDirectory>,
    config: CoreConfig,
}

impl RenewalOrchestrator {
    /// Wire the orchestrator to its collaborators
    pub fn new(
        store: Arc<dyn LeaseStore>,
        events: Arc<dyn EventBus>,
        notifications: Arc<dyn NotificationDispatcher>,
        directory: Arc<dyn StaffDirectory>,
        config: CoreConfig,
    ) -> Self {
        Self {
            store,
            events,
            notifications,
            directory,
            config,
        }
    }

    /// Create a renewal for the given active lease.
    ///
    /// Scheduled (system) calls are idempotent: when an open renewal already
    /// exists it is returned as-is. Human calls hitting an existing open
    /// renewal fail with `Conflict`.
    ///
    /// # Errors
    /// `NotFound` for a missing original, `Validation` for a non-active
    /// original or bad overrides, `Conflict` for a duplicate human call.
    pub async fn create_renewal(
        &self,
        client: ClientId,
        original_luid: &Luid,
        overrides: RenewalOverrides,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<Lease, LeaseError> {
        let original = self
            .store
            .find_by_luid(client, original_luid)
            .await?
            .ok_or_else(|| LeaseError::lease_not_found(original_luid))?;

        if original.status != LeaseStatus::Active {
            return Err(LeaseError::validation(format!(
                "only active leases can be renewed; lease {} is {}",
                original.luid, original.status
            )));
        }

        validate_overrides(&original, &overrides)?;

        let renewal = build_renewal(
            &original,
            &overrides,
            actor,
            self.config.default_renewal_term_months,
            now,
        )?;

        let inserted = match self.store.begin().await {
            Ok(mut txn) => {
                // re-check inside the transaction so check + insert are atomic
                if let Some(existing) = txn.find_open_renewal_of(original.id).await? {
                    return existing_renewal_outcome(existing, &actor);
                }
                let inserted = txn.insert(renewal).await?;
                txn.commit().await?;
                inserted
            }
            Err(LeaseError::Store(StoreError::TransactionsUnsupported)) => {
                tracing::warn!(
                    luid = %original.luid,
                    "store does not support transactions; renewing without one"
                );
                if let Some(existing) = self.store.find_open_renewal_of(original.id).await? {
                    return existing_renewal_outcome(existing, &actor);
                }
                self.store.insert(renewal).await?
            }
            Err(other) => return Err(other),
        };

        tracing::info!(
            original = %original.luid,
            renewal = %inserted.luid,
            approval = ?inserted.approval_status,
            "renewal created"
        );

        // post-commit side effects: allowed to fail independently
        if let Err(e) = self
            .events
            .emit(LeaseEvent::Renewed {
                original_luid: original.luid.clone(),
                renewal_luid: inserted.luid.clone(),
                client_id: client,
            })
            .await
        {
            tracing::warn!(luid = %inserted.luid, error = %e, "renewal event emission failed");
        }

        if inserted.approval_status == ApprovalStatus::Pending {
            self.dispatch_approval_request(&original, &inserted, &actor)
                .await;
        }

        Ok(inserted)
    }

    /// Route the pending-approval notification: original creator for
    /// scheduled calls, the staff actor's supervisor for staff calls.
    async fn dispatch_approval_request(&self, original: &Lease, renewal: &Lease, actor: &Actor) {
        let recipient = match actor {
            Actor::System => original.created_by.user_id(),
            Actor::Human { id, role: ActorRole::Staff } => {
                match self.directory.supervisor_of(*id).await {
                    Ok(Some(supervisor)) => Some(supervisor),
                    Ok(None) => {
                        tracing::warn!(
                            staff = %id,
                            renewal = %renewal.luid,
                            "staff member has no supervisor; approval notification skipped"
                        );
                        None
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "supervisor lookup failed");
                        None
                    }
                }
            }
            Actor::Human { .. } => None,
        };

        if let Some(recipient) = recipient {
            if let Err(e) = self
                .notifications
                .create_notification(
                    recipient,
                    "Renewal awaiting approval",
                    &format!(
                        "Renewal {} of lease {} requires approval",
                        renewal.luid, original.luid
                    ),
                )
                .await
            {
                tracing::warn!(renewal = %renewal.luid, error = %e, "approval notification failed");
            }
        }
    }
}

fn existing_renewal_outcome(existing: Lease, actor: &Actor) -> Result<Lease, LeaseError> {
    if actor.is_system() {
        tracing::debug!(renewal = %existing.luid, "open renewal already exists; scheduled call is a no-op");
        Ok(existing)
    } else {
        Err(LeaseError::Conflict(format!(
            "an open renewal already exists for this lease: {}",
            existing.luid
        )))
    }
}

/// Validate human-supplied overrides against the original lease
fn validate_overrides(original: &Lease, overrides: &RenewalOverrides) -> Result<(), LeaseError> {
    if let (Some(start), Some(end)) = (overrides.start_date, overrides.end_date) {
        if start >= end {
            return Err(LeaseError::validation(
                "renewal start date must precede its end date",
            ));
        }
    }
    if let Some(start) = overrides.start_date {
        if start <= original.duration.end_date {
            return Err(LeaseError::validation(
                "renewal start date must be strictly after the original lease's end date",
            ));
        }
    }
    if overrides.monthly_rent_cents.is_some_and(|c| c < 0)
        || overrides.security_deposit_cents.is_some_and(|c| c < 0)
    {
        return Err(LeaseError::validation("fee amounts must be non-negative"));
    }
    Ok(())
}

/// Clone the policy-relevant sub-documents of the original into a new
/// draft-renewal record with computed default dates.
pub(crate) fn build_renewal(
    original: &Lease,
    overrides: &RenewalOverrides,
    actor: Actor,
    default_term_months: u32,
    now: DateTime<Utc>,
) -> Result<Lease, LeaseError> {
    let term_months = overrides
        .renewal_term_months
        .or(original.renewal_options.renewal_term_months)
        .unwrap_or(default_term_months);

    let start_date = match overrides.start_date {
        Some(start) => start,
        None => original
            .duration
            .end_date
            .succ_opt()
            .ok_or_else(|| LeaseError::validation("original end date is out of range"))?,
    };
    let end_date = match overrides.end_date {
        Some(end) => end,
        None => start_date
            .checked_add_months(Months::new(term_months))
            .ok_or_else(|| LeaseError::validation("renewal term overflows the calendar"))?,
    };

    let approval_status = match actor {
        Actor::Human { role, .. } if role.is_approver() => ApprovalStatus::Approved,
        Actor::System if !original.renewal_options.require_approval => ApprovalStatus::Approved,
        _ => ApprovalStatus::Pending,
    };

    let mut fees = original.fees.clone();
    if let Some(rent) = overrides.monthly_rent_cents {
        fees.monthly_rent_cents = rent;
    }
    if let Some(deposit) = overrides.security_deposit_cents {
        fees.security_deposit_cents = deposit;
    }

    Ok(Lease {
        id: LeaseId::new(),
        luid: Luid::generate(),
        client_id: original.client_id,
        lease_number: renewal_number(&original.lease_number),
        status: LeaseStatus::DraftRenewal,
        approval_status,
        tenant: original.tenant.clone(),
        co_tenants: original.co_tenants.clone(),
        property: original.property.clone(),
        duration: lessor_domain::LeaseDuration::new(start_date, end_date),
        fees,
        renewal_options: original.renewal_options,
        pet_policy: original.pet_policy.clone(),
        utilities_included: original.utilities_included.clone(),
        legal_terms: original.legal_terms.clone(),
        signing_method: original.signing_method,
        esign_provider: original.esign_provider.clone(),
        esignature: None,
        signatures: vec![],
        document: None,
        pending_changes: None,
        approval_details: vec![],
        previous_lease_id: Some(original.id),
        auto_send_info: None,
        internal_notes: None,
        inspection_date: None,
        created_by: actor,
        last_modified_by: vec![],
        created_at: now,
        updated_at: now,
        deleted: false,
    })
}

/// Number the renewal after the original, continuing an existing chain:
/// `L-1001` renews as `L-1001-R1`, which renews as `L-1001-R2`.
fn renewal_number(original: &str) -> String {
    if let Some((base, suffix)) = original.rsplit_once("-R") {
        if let Ok(n) = suffix.parse::<u32>() {
            return format!("{base}-R{}", n + 1);
        }
    }
    format!("{original}-R1")
}
