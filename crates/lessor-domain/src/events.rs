//! Closed event catalog for cross-module propagation
//!
//! Events are a best-effort side channel emitted after a mutation commits;
//! subscribers are wired during module setup, and an emission failure never
//! rolls back the mutation that produced it.

use crate::actor::Actor;
use crate::ids::{ClientId, LeaseId, Luid};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Template used for generated lease documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTemplate {
    StandardLease,
    RenewalLease,
}

/// Job-scoped context threaded through a document-generation request and its
/// completion event. Replaces any shared correlation map keyed by lease id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    /// Who asked for the document
    pub requested_by: Actor,
    /// Submit the lease for signature as soon as the document exists
    pub send_after_generation: bool,
}

/// Every event the core emits, with a closed payload per type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeaseEvent {
    Created {
        luid: Luid,
        client_id: ClientId,
    },
    Activated {
        luid: Luid,
        client_id: ClientId,
        activated_at: DateTime<Utc>,
    },
    Renewed {
        original_luid: Luid,
        renewal_luid: Luid,
        client_id: ClientId,
    },
    Terminated {
        luid: Luid,
        client_id: ClientId,
        termination_date: NaiveDate,
        reason: String,
    },
    Cancelled {
        luid: Luid,
        client_id: ClientId,
    },
    SignatureCompleted {
        luid: Luid,
        envelope_id: String,
    },
    DocumentReady {
        lease_id: LeaseId,
        luid: Luid,
        file_key: String,
        context: DocumentContext,
    },
}

impl LeaseEvent {
    /// Short event name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LeaseEvent::Created { .. } => "lease_created",
            LeaseEvent::Activated { .. } => "lease_activated",
            LeaseEvent::Renewed { .. } => "lease_renewed",
            LeaseEvent::Terminated { .. } => "lease_terminated",
            LeaseEvent::Cancelled { .. } => "lease_cancelled",
            LeaseEvent::SignatureCompleted { .. } => "signature_completed",
            LeaseEvent::DocumentReady { .. } => "document_ready",
        }
    }
}
