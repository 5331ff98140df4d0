//! Lessor Core - lease lifecycle engine
//!
//! The heart of the system:
//! - Collaborator ports (record store, notifications, event bus, e-signature
//!   gateway, document queue, staff directory)
//! - The lease state machine with its guarded transitions
//! - The approval ledger (staged pending changes + append-only trail)
//! - The renewal orchestrator with transactional idempotency
//! - The caller-facing [`LeaseService`] facade
//!
//! Wiring happens once at startup: construct a [`LeaseService`] over the
//! deployment's port implementations and a [`CoreConfig`], then hand it to
//! the controllers and the scheduler jobs.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod approval;
pub mod config;
pub mod ports;
pub mod renewal;
pub mod service;
pub mod state_machine;

pub use config::CoreConfig;
pub use ports::{
    DocumentQueue, ESignatureGateway, EventBus, LeaseStore, LeaseTxn, NotificationDispatcher,
    SenderInfo, SignerInfo, StaffDirectory,
};
pub use renewal::{RenewalOrchestrator, RenewalOverrides};
pub use service::{send_lease_for_signature, BatchResult, LeaseForm, LeaseService};
pub use state_machine::{
    allowed_transitions, check_activation, check_cancellation, check_submission,
    check_termination, validate_transition, SubmitReadiness,
};
