//! Lessor Domain - Lease data model
//!
//! Defines the shared vocabulary of the lease lifecycle core:
//! - Identifiers (lease, client, user, invitation)
//! - The actor model (human roles and the system actor)
//! - The `Lease` aggregate and its sub-documents
//! - Typed partial-update payloads
//! - The closed event catalog for cross-module propagation
//! - The error taxonomy shared by every crate in the workspace

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod actor;
pub mod error;
pub mod events;
pub mod ids;
pub mod lease;
pub mod update;

pub use actor::{Actor, ActorRole, TenantRef};
pub use error::{LeaseError, StoreError};
pub use events::{DocumentContext, DocumentTemplate, LeaseEvent};
pub use ids::{ClientId, InvitationId, LeaseId, Luid, UserId};
pub use lease::{
    ApprovalAction, ApprovalEntry, ApprovalStatus, AutoSendInfo, CoTenant, ESignatureState,
    ESignatureStatus, GeneratedDocument, Lease, LeaseDuration, LeaseFees, LeaseStatus,
    ModificationEntry, PendingChanges, PetPolicy, PropertyRef, RenewalOptions, SignatureEntry,
    SignatureMethod, SignerIdentity, SignerRole, SigningMethod, TenantParty, TerminationData,
};
pub use update::{LeaseField, UpdatePayload};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the lease domain
    pub use crate::{
        Actor, ActorRole, ApprovalStatus, ClientId, Lease, LeaseError, LeaseEvent, LeaseId,
        LeaseStatus, Luid, TenantRef, UpdatePayload, UserId,
    };
}
