//! Lease state machine
//!
//! Transition table plus the guards each caller-facing transition runs before
//! any write: approval-status preconditions, readiness checks, termination
//! validation. Updates themselves route through the policy crate's per-status
//! gates; this module owns status changes only.

use crate::config::CoreConfig;
use lessor_domain::{ApprovalStatus, Lease, LeaseError, LeaseStatus, SigningMethod, TerminationData};

/// Statuses reachable from `from`
#[must_use]
pub fn allowed_transitions(from: LeaseStatus) -> Vec<LeaseStatus> {
    use LeaseStatus::*;
    match from {
        Draft => vec![PendingSignature, Active, Cancelled],
        DraftRenewal => vec![ReadyForSignature, PendingSignature, Active, Cancelled],
        ReadyForSignature => vec![PendingSignature, Active, Cancelled],
        // draft is the fallback when an envelope fails, declines, or expires
        PendingSignature => vec![Active, Draft, Cancelled],
        Active => vec![Terminated, Expired],
        Expired | Terminated | Cancelled => vec![],
    }
}

/// Validate a status transition
///
/// # Errors
/// `Validation` naming both statuses when the transition is not allowed.
pub fn validate_transition(from: LeaseStatus, to: LeaseStatus) -> Result<(), LeaseError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(LeaseError::validation(format!(
            "illegal status transition: {from} -> {to}"
        )))
    }
}

/// Activation guard: approval precondition plus lease readiness.
///
/// `via_esignature` marks activations driven by a completed envelope, which
/// additionally require at least one collected signature.
///
/// # Errors
/// One distinct error per approval status, `Conflict` on re-activation, and
/// `Validation` for readiness failures.
pub fn check_activation(lease: &Lease, via_esignature: bool) -> Result<(), LeaseError> {
    if lease.status == LeaseStatus::Active {
        return Err(LeaseError::Conflict(format!(
            "lease {} is already active",
            lease.luid
        )));
    }
    validate_transition(lease.status, LeaseStatus::Active)?;

    match lease.approval_status {
        ApprovalStatus::Approved => {}
        ApprovalStatus::Pending => {
            return Err(LeaseError::validation(
                "lease cannot be activated while approval is pending",
            ));
        }
        ApprovalStatus::Rejected => {
            return Err(LeaseError::validation(
                "lease cannot be activated: changes were rejected",
            ));
        }
        ApprovalStatus::Draft => {
            return Err(LeaseError::validation(
                "lease cannot be activated while still in draft approval status",
            ));
        }
    }

    if lease.duration.start_date >= lease.duration.end_date {
        return Err(LeaseError::validation(
            "lease requires a start date before its end date",
        ));
    }
    if via_esignature && lease.signatures.is_empty() {
        return Err(LeaseError::validation(
            "e-signature activation requires at least one collected signature",
        ));
    }
    Ok(())
}

/// Termination guard
///
/// # Errors
/// `Validation` when the lease is not active (naming the current status),
/// the reason is too short, or the move-out date precedes the termination
/// date.
pub fn check_termination(
    lease: &Lease,
    data: &TerminationData,
    config: &CoreConfig,
) -> Result<(), LeaseError> {
    if lease.status != LeaseStatus::Active {
        return Err(LeaseError::validation(format!(
            "cannot terminate a lease in {} status",
            lease.status
        )));
    }
    if data.reason.trim().chars().count() < config.min_termination_reason_len {
        return Err(LeaseError::validation(format!(
            "termination reason must be at least {} characters",
            config.min_termination_reason_len
        )));
    }
    if let Some(move_out) = data.move_out_date {
        if move_out < data.termination_date {
            return Err(LeaseError::validation(
                "move-out date cannot precede the termination date",
            ));
        }
    }
    Ok(())
}

/// Cancellation guard: permitted for every draft/pending/ready state
///
/// # Errors
/// `Validation` naming the current status otherwise.
pub fn check_cancellation(lease: &Lease) -> Result<(), LeaseError> {
    match lease.status {
        LeaseStatus::Draft
        | LeaseStatus::DraftRenewal
        | LeaseStatus::PendingSignature
        | LeaseStatus::ReadyForSignature => Ok(()),
        other => Err(LeaseError::validation(format!(
            "cannot cancel a lease in {other} status"
        ))),
    }
}

/// Readiness of a draft lease for e-signature submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReadiness {
    /// Document exists, the lease can move to pending-signature
    Ready,
    /// Document generation must be queued first; the lease stays draft
    AwaitingDocument,
}

/// Guard for draft -> pending-signature
///
/// # Errors
/// `Validation` when the lease is not a draft or not set up for electronic
/// signing.
pub fn check_submission(lease: &Lease) -> Result<SubmitReadiness, LeaseError> {
    if !matches!(
        lease.status,
        LeaseStatus::Draft | LeaseStatus::DraftRenewal | LeaseStatus::ReadyForSignature
    ) {
        return Err(LeaseError::validation(format!(
            "cannot submit a lease in {} status for signature",
            lease.status
        )));
    }
    if lease.signing_method != SigningMethod::Electronic {
        return Err(LeaseError::validation(
            "lease is not configured for electronic signing",
        ));
    }
    if lease.document.is_some() {
        Ok(SubmitReadiness::Ready)
    } else {
        Ok(SubmitReadiness::AwaitingDocument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_admit_no_transitions() {
        for status in [
            LeaseStatus::Expired,
            LeaseStatus::Terminated,
            LeaseStatus::Cancelled,
        ] {
            assert!(allowed_transitions(status).is_empty(), "{status}");
        }
    }

    #[test]
    fn active_can_only_terminate_or_expire() {
        assert_eq!(
            allowed_transitions(LeaseStatus::Active),
            vec![LeaseStatus::Terminated, LeaseStatus::Expired]
        );
    }

    #[test]
    fn illegal_transition_names_both_statuses() {
        let err = validate_transition(LeaseStatus::Active, LeaseStatus::Draft).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("active"), "{msg}");
        assert!(msg.contains("draft"), "{msg}");
    }

    #[test]
    fn cancellation_allowed_for_pre_active_states() {
        for status in [
            LeaseStatus::Draft,
            LeaseStatus::DraftRenewal,
            LeaseStatus::PendingSignature,
            LeaseStatus::ReadyForSignature,
        ] {
            assert!(validate_transition(status, LeaseStatus::Cancelled).is_ok(), "{status}");
        }
        assert!(validate_transition(LeaseStatus::Active, LeaseStatus::Cancelled).is_err());
    }
}
