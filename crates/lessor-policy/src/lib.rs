//! Lessor Policy - Field Mutation Policy
//!
//! The trusted boundary every update payload passes through before any write:
//! - classifies each field as immutable, high-impact, or operational
//! - applies the per-status gate (closed leases, signature lock, active
//!   restrictions)
//! - routes high-impact fields to staging or direct apply based on actor role
//!
//! Classification is a static match on the closed [`LeaseField`] enum; there
//! is no reflection and no dot-path walking.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod field;
pub mod gate;

pub use field::{classification, FieldClass, IMMUTABLE_KEYS};
pub use gate::{classify, Decision, PolicyError, Route};
