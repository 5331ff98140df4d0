//! Lessor E-Sign - provider webhook reconciliation
//!
//! Translates e-signature provider webhooks into lease state: envelope
//! status changes map onto the lease lifecycle, and per-signer events
//! append to the signature ledger with a duplicate-delivery guard.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod event;
pub mod reconciler;

pub use event::{ProviderEvent, UnknownEventType, WebhookPayload};
pub use reconciler::Reconciler;
