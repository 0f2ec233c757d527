//! Shared test utilities for association tests

use std::sync::Arc;

use crate::{
    associated::Associated,
    config::AssociationConfig,
    memory::MemoryStore,
    properties::{Record, RelationKind},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub type TestAssociated = Associated<Arc<MemoryStore>, Arc<MemoryStore>>;

/// Record listing `related` and `derived` ids, with a title so snapshots carry unrelated content.
pub fn create_test_record(id: &str, related: &[&str], derived: &[&str]) -> Record {
    let mut record = Record::new(id).with_attribute(
        "title",
        vec![toml::Value::String(format!("Record {id}"))],
    );
    if !related.is_empty() {
        record = record.with_relation(RelationKind::Related, related);
    }
    if !derived.is_empty() {
        record = record.with_relation(RelationKind::Derived, derived);
    }
    record
}

pub fn create_test_store<I: IntoIterator<Item = Record>>(records: I) -> Arc<MemoryStore> {
    init_logging();
    Arc::new(MemoryStore::from_records(records))
}

pub fn create_associated(store: &Arc<MemoryStore>, config: AssociationConfig) -> TestAssociated {
    Associated::new(store.clone(), store.clone(), config)
}

/// A small graph around `root`:
///
/// ```text
/// p1 --related--> root
/// p2 --derived--> root, p2 --related--> other
/// root --related--> c1
/// root --derived--> c1, c2
/// decoy --related--> root-10   (substring of the root id only)
/// ```
pub fn create_test_graph() -> Arc<MemoryStore> {
    create_test_store([
        create_test_record("root", &["c1"], &["c1", "c2"]),
        create_test_record("p1", &["root"], &[]),
        create_test_record("p2", &["other"], &["root"]),
        create_test_record("c1", &[], &[]),
        create_test_record("c2", &[], &[]),
        create_test_record("other", &[], &[]),
        create_test_record("decoy", &["root-10"], &[]),
        create_test_record("root-10", &[], &[]),
    ])
}
