//! Error taxonomy for the lease lifecycle core
//!
//! One caller-facing enum covers every synchronous operation:
//! - `Validation` - field-policy violations, invalid ranges, missing data
//! - `NotFound` - lease or original lease missing
//! - `Conflict` - existing open renewal, pending-changes lock held elsewhere
//! - `Forbidden` - role not authorized for the requested mutation
//! - `ExternalService` - e-signature / document-queue failures
//! - `Store` - record-store failures, including the one retryable class

use thiserror::Error;

/// Main error type for lease operations
#[derive(Debug, Error)]
pub enum LeaseError {
    /// Request payload violated a validation rule or field policy
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced record does not exist in this client scope
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation conflicts with existing state
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor's role does not permit this mutation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An external collaborator (e-signature, document queue) failed
    #[error("external service failure: {0}")]
    ExternalService(String),

    /// Record store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LeaseError {
    /// Validation error from anything displayable
    pub fn validation(msg: impl Into<String>) -> Self {
        LeaseError::Validation(msg.into())
    }

    /// Not-found error for a lease identified by its external id
    pub fn lease_not_found(luid: impl std::fmt::Display) -> Self {
        LeaseError::NotFound(format!("lease {luid}"))
    }

    /// Whether the error is caller-correctable (bad input, not system failure)
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            LeaseError::Validation(_)
                | LeaseError::NotFound(_)
                | LeaseError::Conflict(_)
                | LeaseError::Forbidden(_)
        )
    }

    /// Whether a scheduled job should surface this to an administrator
    #[must_use]
    pub fn is_system_error(&self) -> bool {
        matches!(self, LeaseError::ExternalService(_) | LeaseError::Store(_))
    }
}

/// Record store error classes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// This deployment cannot open transactions; callers retry once without one
    #[error("transactions unsupported by this deployment")]
    TransactionsUnsupported,

    /// Any other backend failure
    #[error("backend failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_are_not_system_errors() {
        let err = LeaseError::validation("bad dates");
        assert!(err.is_caller_error());
        assert!(!err.is_system_error());
    }

    #[test]
    fn store_errors_escalate() {
        let err = LeaseError::from(StoreError::Backend("connection reset".into()));
        assert!(err.is_system_error());
    }

    #[test]
    fn transactions_unsupported_is_distinguishable() {
        let err = LeaseError::from(StoreError::TransactionsUnsupported);
        assert!(matches!(
            err,
            LeaseError::Store(StoreError::TransactionsUnsupported)
        ));
    }
}
