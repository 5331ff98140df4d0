//! Lessor Jobs - the renewal scheduler
//!
//! Two recurring jobs drive the renewal pipeline:
//! - [`GenerationJob`] creates draft renewals for expiring auto-renew leases
//!   inside a tolerance window around each lease's configured threshold.
//! - [`DispatchJob`] sends approved, signature-ready renewals to the
//!   e-signature provider once their target send date arrives.
//!
//! Both jobs take an explicit `now` so callers (and tests) own the clock;
//! cron wiring lives outside this crate and is described by [`JobDescriptor`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod generation;
pub mod report;

pub use config::SchedulerConfig;
pub use descriptor::JobDescriptor;
pub use dispatch::DispatchJob;
pub use generation::GenerationJob;
pub use report::{JobFailure, JobReport};
