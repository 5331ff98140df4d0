//! Testing utilities for the lessor workspace
//!
//! Shared in-memory store, recording collaborator doubles, and lease
//! fixtures used across crate test suites.

#![allow(missing_docs)]

pub mod doubles;
pub mod fixtures;
pub mod store;

pub use doubles::{
    RecordingDocumentQueue, RecordingEventBus, RecordingNotifier, StaticDirectory, StubGateway,
};
pub use store::MemoryLeaseStore;

/// Initialize tracing for a test binary; repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
