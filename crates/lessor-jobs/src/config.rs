//! Scheduler tuning knobs

use lessor_core::SenderInfo;
use serde::{Deserialize, Serialize};

/// Shared configuration for the two scheduler jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Days below the generation threshold still considered in-window
    pub generation_tolerance_days: i64,
    /// Days past the original lease's end date after which auto-send is a
    /// failure needing manual review
    pub dispatch_grace_days: i64,
    /// Sender identity stamped onto auto-sent envelopes
    pub sender: SenderInfo,
}

impl SchedulerConfig {
    #[inline]
    #[must_use]
    pub fn new(sender: SenderInfo) -> Self {
        Self {
            generation_tolerance_days: 1,
            dispatch_grace_days: 7,
            sender,
        }
    }

    #[must_use]
    pub fn with_generation_tolerance_days(mut self, days: i64) -> Self {
        self.generation_tolerance_days = days;
        self
    }

    #[must_use]
    pub fn with_dispatch_grace_days(mut self, days: i64) -> Self {
        self.dispatch_grace_days = days;
        self
    }
}
