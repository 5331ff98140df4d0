//! The `Lease` aggregate and its sub-documents
//!
//! A lease moves through a multi-state lifecycle (draft through active to a
//! terminal status), carries an approval workflow (staged pending changes plus
//! an append-only approval trail), a per-signer signature ledger, and an
//! optional back-reference forming the renewal chain.

use crate::actor::{Actor, TenantRef};
use crate::error::LeaseError;
use crate::ids::{ClientId, LeaseId, Luid, UserId};
use crate::update::UpdatePayload;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a lease
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Draft,
    DraftRenewal,
    PendingSignature,
    ReadyForSignature,
    Active,
    Expired,
    Terminated,
    Cancelled,
}

impl LeaseStatus {
    /// Terminal statuses admit no further transitions
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LeaseStatus::Expired | LeaseStatus::Terminated | LeaseStatus::Cancelled
        )
    }

    /// Closed statuses share the most restrictive update handler
    #[inline]
    #[must_use]
    pub fn is_closed(self) -> bool {
        self.is_terminal()
    }

    /// Statuses counting as an open (non-terminal) renewal
    #[inline]
    #[must_use]
    pub fn is_open_renewal_state(self) -> bool {
        matches!(
            self,
            LeaseStatus::DraftRenewal
                | LeaseStatus::PendingSignature
                | LeaseStatus::ReadyForSignature
                | LeaseStatus::Active
        )
    }
}

impl std::fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeaseStatus::Draft => "draft",
            LeaseStatus::DraftRenewal => "draft_renewal",
            LeaseStatus::PendingSignature => "pending_signature",
            LeaseStatus::ReadyForSignature => "ready_for_signature",
            LeaseStatus::Active => "active",
            LeaseStatus::Expired => "expired",
            LeaseStatus::Terminated => "terminated",
            LeaseStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Approval workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

/// How the lease will be signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningMethod {
    Manual,
    Electronic,
    Pending,
}

/// E-signature envelope status as tracked locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ESignatureStatus {
    Draft,
    Sent,
    Completed,
    Declined,
    Voided,
}

/// Local mirror of the provider envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ESignatureState {
    pub provider: String,
    pub envelope_id: String,
    pub status: ESignatureStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Role resolved for a signature entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Tenant,
    CoTenant,
    PropertyManager,
}

/// How a signature was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMethod {
    Manual,
    Electronic,
}

/// Distinct signer identity; co-tenants without accounts sign by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignerIdentity {
    User(UserId),
    Email(String),
}

/// One collected signature; at most one entry per distinct identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub role: SignerRole,
    pub signer: SignerIdentity,
    pub method: SignatureMethod,
    pub signed_at: DateTime<Utc>,
}

/// The tenant party on the lease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantParty {
    pub reference: TenantRef,
    pub name: String,
    pub email: String,
}

/// A co-tenant; may or may not have an account yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoTenant {
    pub name: String,
    pub email: String,
    pub user_id: Option<UserId>,
}

/// Narrow property snapshot: the property/unit domain model stays external,
/// this is only what signer resolution and notification routing need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub property_id: String,
    pub unit_id: Option<String>,
    pub manager_user_id: Option<UserId>,
    pub manager_email: Option<String>,
}

/// Lease term dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseDuration {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
}

impl LeaseDuration {
    /// Fixed-term duration with no move dates yet
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            move_in_date: None,
            move_out_date: None,
            termination_date: None,
        }
    }
}

/// Financial terms; money amounts are minor units (cents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseFees {
    pub monthly_rent_cents: i64,
    pub security_deposit_cents: i64,
    pub rent_due_day: u8,
    pub currency: String,
    pub late_fee_cents: Option<i64>,
    pub late_fee_grace_days: Option<u8>,
}

/// Renewal behavior configured per lease
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalOptions {
    pub auto_renew: bool,
    pub require_approval: bool,
    pub days_before_expiry_to_generate_renewal: Option<i64>,
    pub enable_auto_send_for_signature: bool,
    pub days_before_expiry_to_auto_send_signature: Option<i64>,
    pub renewal_term_months: Option<u32>,
}

impl Default for RenewalOptions {
    fn default() -> Self {
        Self {
            auto_renew: false,
            require_approval: true,
            days_before_expiry_to_generate_renewal: None,
            enable_auto_send_for_signature: false,
            days_before_expiry_to_auto_send_signature: None,
            renewal_term_months: None,
        }
    }
}

/// Pet policy terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetPolicy {
    pub pets_allowed: bool,
    pub pet_deposit_cents: Option<i64>,
    pub restrictions: Option<String>,
}

/// Generated lease document reference; presence is the readiness check
/// for sending the lease out for signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub file_key: String,
    pub template: crate::events::DocumentTemplate,
    pub generated_at: DateTime<Utc>,
}

/// Staged, not-yet-applied field set awaiting an approval decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChanges {
    pub fields: UpdatePayload,
    pub requested_by: Actor,
    pub requested_at: DateTime<Utc>,
}

/// Action recorded in the approval trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approved,
    Rejected,
    Overridden,
    AutoApproved,
}

/// Append-only approval trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub action: ApprovalAction,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Append-only modification log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationEntry {
    pub actor: Actor,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

/// Auto-send bookkeeping for renewals the dispatch job could not send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSendInfo {
    pub failure_reason: Option<String>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// Input for lease termination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationData {
    pub reason: String,
    pub termination_date: NaiveDate,
    pub move_out_date: Option<NaiveDate>,
}

/// The central lease record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub luid: Luid,
    pub client_id: ClientId,
    pub lease_number: String,

    pub status: LeaseStatus,
    pub approval_status: ApprovalStatus,

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
    pub esignature: Option<ESignatureState>,
    pub signatures: Vec<SignatureEntry>,
    pub document: Option<GeneratedDocument>,

    pub pending_changes: Option<PendingChanges>,
    pub approval_details: Vec<ApprovalEntry>,

    pub previous_lease_id: Option<LeaseId>,
    pub auto_send_info: Option<AutoSendInfo>,

    pub internal_notes: Option<String>,
    pub inspection_date: Option<NaiveDate>,

    pub created_by: Actor,
    pub last_modified_by: Vec<ModificationEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

impl Lease {
    /// Record a modification in the append-only actor log
    pub fn touch(&mut self, actor: Actor, action: impl Into<String>, now: DateTime<Utc>) {
        self.last_modified_by.push(ModificationEntry {
            actor,
            action: action.into(),
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Append an approval trail entry
    pub fn record_approval(
        &mut self,
        action: ApprovalAction,
        actor: Actor,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.approval_details.push(ApprovalEntry {
            action,
            actor,
            timestamp: now,
            notes,
        });
    }

    /// Whether a signature for this identity already exists
    #[must_use]
    pub fn has_signature(&self, signer: &SignerIdentity) -> bool {
        self.signatures.iter().any(|s| &s.signer == signer)
    }

    /// Append a signature unless one exists for the same identity.
    /// Returns false on duplicate delivery.
    pub fn append_signature(&mut self, entry: SignatureEntry) -> bool {
        if self.has_signature(&entry.signer) {
            return false;
        }
        self.signatures.push(entry);
        true
    }

    /// Resolve a pending invitation into a real user id, exactly once
    ///
    /// # Errors
    /// `Validation` when the lease does not hold this pending invitation.
    pub fn resolve_invitation(
        &mut self,
        invitation: crate::ids::InvitationId,
        user: UserId,
    ) -> Result<(), LeaseError> {
        match &mut self.tenant {
            Some(party) if party.reference == TenantRef::PendingInvitation(invitation) => {
                party.reference = TenantRef::ExistingUser(user);
                Ok(())
            }
            _ => Err(LeaseError::validation(format!(
                "lease {} holds no pending invitation {invitation}",
                self.luid
            ))),
        }
    }

    /// Whether this lease counts as an open renewal in its chain
    #[must_use]
    pub fn is_open_renewal(&self) -> bool {
        self.previous_lease_id.is_some() && self.status.is_open_renewal_state()
    }

    /// Only draft and cancelled leases may be soft-deleted
    #[must_use]
    pub fn can_delete(&self) -> bool {
        matches!(self.status, LeaseStatus::Draft | LeaseStatus::Cancelled)
    }
}
