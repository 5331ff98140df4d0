//! Identifier newtypes
//!
//! Internal keys are ULIDs (sortable, creation-ordered); externally supplied
//! identities (users, invitations) are UUIDs. The `Luid` is the stable
//! external lease id handed to API callers, distinct from the internal key.

use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

/// Internal lease record key (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeaseId(pub Ulid);

impl LeaseId {
    /// Generate new lease ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LeaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tenant/organization scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Ulid);

impl ClientId {
    /// Generate new client ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable external lease identifier, exposed to API callers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Luid(pub String);

impl Luid {
    /// Generate a new external id (`lse-` prefix + lowercase ULID)
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("lse-{}", Ulid::new().to_string().to_lowercase()))
    }

    /// Borrow the underlying string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Luid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Luid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// User account identifier (externally issued)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate new random user ID (test fixtures)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invitation identifier, used as a tenant stand-in before account creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub Uuid);

impl InvitationId {
    /// Generate new random invitation ID (test fixtures)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luid_has_prefix() {
        let luid = Luid::generate();
        assert!(luid.as_str().starts_with("lse-"));
    }

    #[test]
    fn lease_id_order_follows_the_embedded_timestamp() {
        // the timestamp component dominates the random bits
        let earlier = LeaseId(Ulid::from_parts(1_000, u128::MAX));
        let later = LeaseId(Ulid::from_parts(2_000, 0));
        assert!(earlier < later);
    }
}
