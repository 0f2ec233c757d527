//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::sync::Arc;

use noet_associations::{
    associated::Associated,
    config::AssociationConfig,
    memory::MemoryStore,
    properties::{Record, RelationKind},
};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times. Subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Record `id` listing `related` under RELATED and `derived` under DERIVED.
#[allow(dead_code)]
pub fn record(id: &str, related: &[&str], derived: &[&str]) -> Record {
    Record::new(id)
        .with_relation(RelationKind::Related, related)
        .with_relation(RelationKind::Derived, derived)
}

/// Store and endpoint sharing it for both queries and updates.
#[allow(dead_code)]
pub fn endpoint<I: IntoIterator<Item = Record>>(
    records: I,
) -> (
    Arc<MemoryStore>,
    Associated<Arc<MemoryStore>, Arc<MemoryStore>>,
) {
    init_logging();
    let store = Arc::new(MemoryStore::from_records(records));
    let associated = Associated::new(store.clone(), store.clone(), AssociationConfig::default());
    (store, associated)
}
