//! Aggregate job run reporting

use lessor_domain::Luid;
use serde::{Deserialize, Serialize};

/// One lease the job could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub luid: Luid,
    pub message: String,
}

/// Aggregate outcome of one job run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub job: String,
    /// Candidates examined
    pub processed: usize,
    /// Renewals created (generation) or envelopes sent (dispatch)
    pub succeeded: usize,
    /// Candidates out of window or otherwise not actionable
    pub skipped: usize,
    /// Candidates that errored or were marked failed
    pub failed: usize,
    pub failures: Vec<JobFailure>,
}

impl JobReport {
    #[must_use]
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            processed: 0,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record_failure(&mut self, luid: Luid, message: impl Into<String>) {
        self.failed += 1;
        self.failures.push(JobFailure {
            luid,
            message: message.into(),
        });
    }
}
