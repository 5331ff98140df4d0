//! Actor model
//!
//! Every mutation is attributed to an [`Actor`]: a human with a role, or the
//! system itself (scheduled jobs). There is no sentinel "system account id" -
//! scheduled calls carry their own variant so idempotency and notification
//! routing can branch on it explicitly.

use crate::ids::{InvitationId, UserId};
use serde::{Deserialize, Serialize};

/// Role attached to a human actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Day-to-day operator; high-impact changes are staged for approval
    Staff,
    /// Property manager; may apply high-impact changes directly
    Manager,
    /// Organization administrator; may apply high-impact changes directly
    Admin,
}

impl ActorRole {
    /// Whether this role may apply high-impact changes without staging
    #[inline]
    #[must_use]
    pub fn is_approver(self) -> bool {
        matches!(self, ActorRole::Manager | ActorRole::Admin)
    }
}

/// The originator of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// A human caller with an account and a role
    Human { id: UserId, role: ActorRole },
    /// A scheduled/automated invocation
    System,
}

impl Actor {
    /// Convenience constructor for a staff actor
    #[inline]
    #[must_use]
    pub fn staff(id: UserId) -> Self {
        Actor::Human {
            id,
            role: ActorRole::Staff,
        }
    }

    /// Convenience constructor for a manager actor
    #[inline]
    #[must_use]
    pub fn manager(id: UserId) -> Self {
        Actor::Human {
            id,
            role: ActorRole::Manager,
        }
    }

    /// Convenience constructor for an admin actor
    #[inline]
    #[must_use]
    pub fn admin(id: UserId) -> Self {
        Actor::Human {
            id,
            role: ActorRole::Admin,
        }
    }

    /// The user id, when the actor is human
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Actor::Human { id, .. } => Some(*id),
            Actor::System => None,
        }
    }

    /// Whether this actor may apply high-impact changes directly
    #[must_use]
    pub fn can_approve(&self) -> bool {
        match self {
            Actor::Human { role, .. } => role.is_approver(),
            Actor::System => true,
        }
    }

    /// Whether this is a scheduled (system) call
    #[inline]
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Actor::System)
    }

    /// Whether two actors are the same identity
    #[must_use]
    pub fn same_identity(&self, other: &Actor) -> bool {
        match (self, other) {
            (Actor::Human { id: a, .. }, Actor::Human { id: b, .. }) => a == b,
            (Actor::System, Actor::System) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Human { id, role } => write!(f, "{role:?}:{id}"),
            Actor::System => write!(f, "system"),
        }
    }
}

/// Reference to the lease's tenant party
///
/// Before the invitee has an account the lease carries the invitation id;
/// it is resolved to a real user id exactly once at invitation acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TenantRef {
    /// Tenant already has an account
    ExistingUser(UserId),
    /// Tenant was invited but has not yet accepted
    PendingInvitation(InvitationId),
}

impl TenantRef {
    /// The user id, when already resolved
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            TenantRef::ExistingUser(id) => Some(*id),
            TenantRef::PendingInvitation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_cannot_approve() {
        let actor = Actor::staff(UserId::new());
        assert!(!actor.can_approve());
    }

    #[test]
    fn managers_admins_and_system_can_approve() {
        assert!(Actor::manager(UserId::new()).can_approve());
        assert!(Actor::admin(UserId::new()).can_approve());
        assert!(Actor::System.can_approve());
    }

    #[test]
    fn same_identity_ignores_role() {
        let id = UserId::new();
        assert!(Actor::staff(id).same_identity(&Actor::admin(id)));
        assert!(!Actor::staff(id).same_identity(&Actor::System));
    }
}
