//! Approval ledger
//!
//! Maintains the staged `pending_changes` payload and the append-only
//! approval trail. These functions mutate the lease in memory; the caller
//! owns persistence and the best-effort decision notifications.

use chrono::{DateTime, Utc};
use lessor_domain::{
    Actor, ApprovalAction, ApprovalStatus, Lease, LeaseError, PendingChanges, UpdatePayload,
};

/// Stage a high-impact field set for approval (staff path).
///
/// # Errors
/// `Conflict` naming the current holder when pending changes staged by a
/// different actor already exist.
pub fn stage_change(
    lease: &mut Lease,
    staged: UpdatePayload,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<(), LeaseError> {
    if let Some(pending) = &lease.pending_changes {
        if !pending.requested_by.same_identity(actor) {
            return Err(LeaseError::Conflict(format!(
                "pending changes already staged by {}",
                pending.requested_by
            )));
        }
    }
    lease.pending_changes = Some(PendingChanges {
        fields: staged,
        requested_by: *actor,
        requested_at: now,
    });
    lease.approval_status = ApprovalStatus::Pending;
    tracing::debug!(luid = %lease.luid, actor = %actor, "staged pending changes");
    Ok(())
}

/// Apply high-impact fields directly (approval-role path).
///
/// When pending changes staged by a different actor exist, they are
/// superseded: the new fields apply, the staged set is discarded, and an
/// `Overridden` trail entry records whose changes were dropped. Returns the
/// superseded requester so the caller can notify them.
pub fn apply_direct(
    lease: &mut Lease,
    payload: &UpdatePayload,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Option<Actor>, LeaseError> {
    let superseded = match lease.pending_changes.take() {
        Some(pending) if !pending.requested_by.same_identity(actor) => {
            lease.record_approval(
                ApprovalAction::Overridden,
                *actor,
                Some(format!(
                    "superseded pending changes staged by {}",
                    pending.requested_by
                )),
                now,
            );
            tracing::info!(
                luid = %lease.luid,
                holder = %pending.requested_by,
                actor = %actor,
                "pending changes overridden by direct apply"
            );
            Some(pending.requested_by)
        }
        _ => None,
    };

    payload.apply_to(lease);
    lease.approval_status = ApprovalStatus::Approved;
    Ok(superseded)
}

/// Approve the staged changes.
///
/// Merges every staged field into the lease, clears the staged set, marks the
/// lease approved, and appends an `Approved` trail entry. Also used for
/// renewals awaiting approval, which are pending without a staged field set.
/// Returns the original requester, when there was one, for notification.
///
/// # Errors
/// `Validation` when nothing is pending.
pub fn approve(
    lease: &mut Lease,
    actor: &Actor,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<Option<Actor>, LeaseError> {
    if lease.approval_status != ApprovalStatus::Pending {
        return Err(LeaseError::validation(format!(
            "lease {} has nothing pending to approve",
            lease.luid
        )));
    }

    let requester = lease.pending_changes.take().map(|pending| {
        pending.fields.apply_to(lease);
        pending.requested_by
    });

    lease.approval_status = ApprovalStatus::Approved;
    lease.record_approval(ApprovalAction::Approved, *actor, notes, now);
    tracing::info!(luid = %lease.luid, actor = %actor, "lease approved");
    Ok(requester)
}

/// Reject the staged changes, discarding them.
///
/// # Errors
/// `Validation` when the reason is empty or nothing is pending.
pub fn reject(
    lease: &mut Lease,
    actor: &Actor,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<Option<Actor>, LeaseError> {
    if reason.trim().is_empty() {
        return Err(LeaseError::validation("a rejection reason is required"));
    }
    if lease.approval_status != ApprovalStatus::Pending {
        return Err(LeaseError::validation(format!(
            "lease {} has nothing pending to reject",
            lease.luid
        )));
    }

    let requester = lease.pending_changes.take().map(|p| p.requested_by);
    lease.approval_status = ApprovalStatus::Rejected;
    lease.record_approval(ApprovalAction::Rejected, *actor, Some(reason.to_string()), now);
    tracing::info!(luid = %lease.luid, actor = %actor, reason, "lease changes rejected");
    Ok(requester)
}
