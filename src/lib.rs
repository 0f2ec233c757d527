//! # noet-associations
//!
//! Discovery, diffing and reconciliation of typed association edges between records held in an
//! external, searchable record store.
//!
//! ## Overview
//!
//! A record asserts an association by listing another record's id in one of its relation
//! attributes (`metacard.associations.related`, `metacard.associations.derived`). Given a root
//! record, this crate finds every such edge pointing at or away from the root, compares that set
//! with the one a caller wants, and writes back only the records whose attribute lists have to
//! change.
//!
//! The record store itself stays outside the crate. It is reached through two traits:
//!
//! - **[`query::RecordSource`]**: filter in, `id → record` map out
//! - **[`update::RecordSink`]**: a batch of changed records in, all-or-nothing commit
//!
//! [`memory::MemoryStore`] implements both in memory.
//!
//! ## Architecture
//!
//! Data flows one way, root id → discovery → diff → mutation → submission:
//!
//! - **[`properties`]**: [`properties::Record`] and the closed [`properties::RelationKind`] set
//! - **[`edge`]**: [`edge::Edge`], whose identity is `(parent id, child id, relation)` only
//! - **[`discovery`]**: derives the current edge set of a root from two queries
//! - **[`diff`]**: `(old − new, new − old)` over edge sets
//! - **[`accumulator`]**: [`accumulator::WorkingSet`], which merges every edit to a record into one
//!   working copy
//! - **[`associated`]**: [`associated::Associated`], the reconciliation driver
//! - **[`event`]**: notifications for committed changes
//! - **[`config`]**: TOML backed settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use noet_associations::{
//!     associated::Associated,
//!     config::AssociationConfig,
//!     edge::Edge,
//!     memory::MemoryStore,
//!     properties::{Record, RelationKind},
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::from_records([
//!         Record::new("report"),
//!         Record::new("image"),
//!     ]));
//!     let associated = Associated::new(store.clone(), store.clone(), AssociationConfig::default());
//!
//!     let report = associated
//!         .reconcile("report", [Edge::between("report", "image", RelationKind::Derived)])
//!         .await?;
//!     assert_eq!(report.submitted, vec!["report".to_string()]);
//!
//!     for edge in associated.get_associations("report").await? {
//!         println!("{edge}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Reconciling the same desired set twice writes at most once.
//! - A root that doesn't resolve fails with [`BuildonomyError::NotFound`] before anything is
//!   written.
//! - Query failures abort discovery; no partial edge set is diffed.
//! - Records are submitted as one batch, or not at all.

pub mod accumulator;
pub mod associated;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod edge;
pub mod error;
pub mod event;
pub mod memory;
pub mod properties;
pub mod query;
#[cfg(test)]
mod tests;
pub mod update;

pub use error::*;
