//! Job descriptors handed to the scheduling infrastructure

use serde::{Deserialize, Serialize};

/// Registration record for one recurring job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    /// Cron expression, evaluated by the external scheduler
    pub schedule: String,
    pub enabled: bool,
    /// Maximum run duration before the scheduler kills the job
    pub timeout_ms: u64,
}

impl JobDescriptor {
    /// Default registration for the renewal generation job
    #[must_use]
    pub fn renewal_generation() -> Self {
        Self {
            name: "renewal-generation".into(),
            schedule: "0 0 2 * * *".into(),
            enabled: true,
            timeout_ms: 600_000,
        }
    }

    /// Default registration for the signature dispatch job
    #[must_use]
    pub fn renewal_dispatch() -> Self {
        Self {
            name: "renewal-dispatch".into(),
            schedule: "0 0 3 * * *".into(),
            enabled: true,
            timeout_ms: 600_000,
        }
    }
}
