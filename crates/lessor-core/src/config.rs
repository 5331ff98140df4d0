//! Core configuration

use serde::{Deserialize, Serialize};

/// Tunables for the lease lifecycle core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Renewal term applied when neither the override nor the original lease
    /// specifies one
    pub default_renewal_term_months: u32,
    /// Minimum length of a termination reason
    pub min_termination_reason_len: usize,
}

impl CoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default renewal term
    #[inline]
    #[must_use]
    pub fn with_default_renewal_term_months(mut self, months: u32) -> Self {
        self.default_renewal_term_months = months;
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_renewal_term_months: 12,
            min_termination_reason_len: 10,
        }
    }
}
