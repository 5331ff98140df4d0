//! Per-status gates and payload classification
//!
//! One handler per status family, mirroring how updates route in the state
//! machine: draft, pending-signature (locked), active (restricted), closed.

use crate::field::{classification, FieldClass, IMMUTABLE_KEYS};
use lessor_domain::{Actor, LeaseError, LeaseField, LeaseStatus, UpdatePayload};
use thiserror::Error;

/// Where high-impact fields go for this actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Approval-role actor: apply immediately
    Direct,
    /// Staff actor: stage as pending changes
    Stage,
}

/// Accepted classification of an update payload
#[derive(Debug, Clone)]
pub struct Decision {
    /// Fields applied directly regardless of role
    pub operational: UpdatePayload,
    /// Fields subject to the approval workflow
    pub high_impact: UpdatePayload,
    /// How the high-impact part is applied
    pub route: Route,
}

impl Decision {
    /// Whether the payload carried any high-impact field
    #[must_use]
    pub fn has_high_impact(&self) -> bool {
        !self.high_impact.is_empty()
    }
}

/// Policy violations; converted to the shared error taxonomy at the seam
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("empty update payload")]
    EmptyPayload,

    #[error("immutable fields cannot be updated: {}", .0.join(", "))]
    ImmutableFields(Vec<String>),

    #[error("unknown fields: {}", .0.join(", "))]
    UnknownFields(Vec<String>),

    #[error("lease is {status}; only internal notes may be changed ({})",
            joined(.fields))]
    ClosedLease {
        status: LeaseStatus,
        fields: Vec<LeaseField>,
    },

    #[error("lease is locked while awaiting signature; approval role required")]
    LockedForSignature { status: LeaseStatus },

    #[error("fields not editable while the lease is active: {}", joined(.0))]
    ActiveRestricted(Vec<LeaseField>),
}

fn joined(fields: &[LeaseField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<PolicyError> for LeaseError {
    fn from(value: PolicyError) -> Self {
        match value {
            PolicyError::LockedForSignature { .. } => LeaseError::Forbidden(value.to_string()),
            _ => LeaseError::Validation(value.to_string()),
        }
    }
}

/// Fields hard-rejected once a lease is active: the signed legal and
/// financial core of the agreement.
const ACTIVE_RESTRICTED: &[LeaseField] = &[
    LeaseField::Tenant,
    LeaseField::Property,
    LeaseField::MonthlyRent,
    LeaseField::SecurityDeposit,
    LeaseField::StartDate,
    LeaseField::EndDate,
    LeaseField::MoveInDate,
    LeaseField::MoveOutDate,
];

/// Classify an update payload against the lease's current status and the
/// actor's role. Enforced before any write occurs.
///
/// # Errors
/// - [`PolicyError::ImmutableFields`] / [`PolicyError::UnknownFields`] -
///   the entire request is rejected, naming every offending key
/// - [`PolicyError::EmptyPayload`] - nothing to do
/// - per-status gate violations
pub fn classify(
    payload: &UpdatePayload,
    status: LeaseStatus,
    actor: &Actor,
) -> Result<Decision, PolicyError> {
    // Immutable/unknown keys reject the whole request, before anything else.
    if !payload.unrecognized.is_empty() {
        let (immutable, unknown): (Vec<String>, Vec<String>) = payload
            .unrecognized
            .keys()
            .cloned()
            .partition(|key| IMMUTABLE_KEYS.contains(&key.as_str()));
        if !immutable.is_empty() {
            return Err(PolicyError::ImmutableFields(immutable));
        }
        return Err(PolicyError::UnknownFields(unknown));
    }

    let fields = payload.fields();
    if fields.is_empty() {
        return Err(PolicyError::EmptyPayload);
    }

    gate(status, actor, &fields)?;

    let (high_impact, operational): (Vec<LeaseField>, Vec<LeaseField>) = fields
        .into_iter()
        .partition(|f| classification(*f) == FieldClass::HighImpact);

    let route = if actor.can_approve() {
        Route::Direct
    } else {
        Route::Stage
    };

    Ok(Decision {
        operational: payload.project(&operational),
        high_impact: payload.project(&high_impact),
        route,
    })
}

/// Status-specific gate, one arm per update handler
fn gate(status: LeaseStatus, actor: &Actor, fields: &[LeaseField]) -> Result<(), PolicyError> {
    match status {
        LeaseStatus::Draft | LeaseStatus::DraftRenewal => Ok(()),
        LeaseStatus::PendingSignature | LeaseStatus::ReadyForSignature => {
            pending_signature_gate(status, actor)
        }
        LeaseStatus::Active => active_gate(fields),
        LeaseStatus::Expired | LeaseStatus::Terminated | LeaseStatus::Cancelled => {
            closed_gate(status, fields)
        }
    }
}

/// Awaiting signature: the lease is locked, only approval roles may edit
fn pending_signature_gate(status: LeaseStatus, actor: &Actor) -> Result<(), PolicyError> {
    if actor.can_approve() {
        Ok(())
    } else {
        Err(PolicyError::LockedForSignature { status })
    }
}

/// Active: the signed core of the agreement may not change at all
fn active_gate(fields: &[LeaseField]) -> Result<(), PolicyError> {
    let offending: Vec<LeaseField> = fields
        .iter()
        .copied()
        .filter(|f| ACTIVE_RESTRICTED.contains(f))
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(PolicyError::ActiveRestricted(offending))
    }
}

/// Closed (terminated/cancelled/expired): internal notes only
fn closed_gate(status: LeaseStatus, fields: &[LeaseField]) -> Result<(), PolicyError> {
    let offending: Vec<LeaseField> = fields
        .iter()
        .copied()
        .filter(|f| *f != LeaseField::InternalNotes)
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(PolicyError::ClosedLease {
            status,
            fields: offending,
        })
    }
}
