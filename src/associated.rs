//! Reconciliation of a root record's association edges against a desired edge set.
//!
//! [Associated::reconcile] runs discovery, diffs the result against the caller's edges, resolves
//! every referenced record with one batched query, applies removals and then additions to a
//! [WorkingSet], and submits the touched records as one update. Nothing is written when the diff
//! is empty, so reconciling the same desired set twice writes at most once.
//!
//! No lock or version is held across the read-diff-write window. Two reconciliations touching the
//! same parent race at the record store; set [AssociationConfig::check_versions] against a store
//! that honours [UpdateRequest::expected_versions] to turn a lost write into
//! [BuildonomyError::UpdateRejected].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    accumulator::WorkingSet,
    config::AssociationConfig,
    diff::diff,
    discovery::{discover, Discovery},
    edge::Edge,
    event::AssociationEvent,
    properties::{Record, TAGS_ATTRIBUTE},
    query::{Filter, QueryRequest, RecordSource},
    update::{RecordSink, UpdateRequest},
    BuildonomyError,
};

/// What a reconciliation changed. `submitted` is empty when nothing was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub removed: BTreeSet<Edge>,
    pub added: BTreeSet<Edge>,
    pub submitted: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.submitted.is_empty()
    }
}

/// Association endpoint over a record store's query (`Q`) and update (`U`) services.
///
/// Holds no per-call state; concurrent calls for different roots are independent.
pub struct Associated<Q, U> {
    source: Q,
    sink: U,
    config: AssociationConfig,
    events: Option<UnboundedSender<AssociationEvent>>,
}

impl<Q: RecordSource, U: RecordSink> Associated<Q, U> {
    pub fn new(source: Q, sink: U, config: AssociationConfig) -> Self {
        Associated {
            source,
            sink,
            config,
            events: None,
        }
    }

    /// Publish an [AssociationEvent] stream for committed changes.
    pub fn with_events(mut self, tx: UnboundedSender<AssociationEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &AssociationConfig {
        &self.config
    }

    pub async fn discover(&self, root_id: &str) -> Result<Discovery, BuildonomyError> {
        discover(&self.source, &self.config, root_id).await
    }

    /// Current association edges of `root_id`, parents and children alike.
    pub async fn get_associations(&self, root_id: &str) -> Result<Vec<Edge>, BuildonomyError> {
        Ok(self.discover(root_id).await?.edges.into_iter().collect())
    }

    /// Make the association edges of `root_id` equal `desired`.
    ///
    /// Every desired edge must have `root_id` at one end and use an enabled relation kind, or
    /// the call fails with [BuildonomyError::Custom] once the root has been found. The child of
    /// every edge to add must resolve, or the call fails with [BuildonomyError::NotFound] before
    /// anything is written.
    #[tracing::instrument(skip(self, desired))]
    pub async fn reconcile<I>(
        &self,
        root_id: &str,
        desired: I,
    ) -> Result<ReconcileReport, BuildonomyError>
    where
        I: IntoIterator<Item = Edge>,
    {
        let desired: BTreeSet<Edge> = desired.into_iter().collect();
        let old_edges = self.discover(root_id).await?.edges;
        self.check_desired(root_id, &desired)?;

        let edge_diff = diff(&old_edges, &desired);
        if edge_diff.is_empty() {
            tracing::debug!("Associations of {root_id} already match, nothing to write");
            return Ok(ReconcileReport::default());
        }
        tracing::info!(
            "Reconciling {root_id}: removing {} edge(s), adding {} edge(s)",
            edge_diff.to_remove.len(),
            edge_diff.to_add.len()
        );

        let ids: BTreeSet<String> = edge_diff
            .edges()
            .chain(desired.iter())
            .chain(old_edges.iter())
            .flat_map(|e| [e.parent_id().to_string(), e.child_id().to_string()])
            .collect();
        let resolved = self.resolve(ids).await?;
        // discovery never reports an edge to an unresolved child
        if let Some(edge) = edge_diff
            .to_add
            .iter()
            .find(|e| !resolved.contains_key(e.child_id()))
        {
            return Err(BuildonomyError::NotFound(format!(
                "Cannot add edge {edge}: child record '{}' was not resolved",
                edge.child_id()
            )));
        }
        let mut working_set = WorkingSet::new(resolved);
        working_set.apply_diff(&edge_diff)?;

        if working_set.is_empty() {
            return Ok(ReconcileReport::default());
        }
        let request = working_set.into_update(self.config.check_versions);
        let submitted = request.ids.clone();
        self.sink.update(request).await?;
        tracing::info!("Updated {} record(s) for {root_id}", submitted.len());

        let report = ReconcileReport {
            removed: edge_diff.to_remove,
            added: edge_diff.to_add,
            submitted,
        };
        self.publish(&report);
        Ok(report)
    }

    fn check_desired(&self, root_id: &str, desired: &BTreeSet<Edge>) -> Result<(), BuildonomyError> {
        for edge in desired.iter() {
            if !edge.touches(root_id) {
                return Err(BuildonomyError::Custom(format!(
                    "Desired edge {edge} does not involve root record '{root_id}'"
                )));
            }
            if !self.config.relations.contains(edge.relation()) {
                return Err(BuildonomyError::Custom(format!(
                    "Desired edge {edge} uses relation {} which is not enabled",
                    edge.relation()
                )));
            }
        }
        Ok(())
    }

    /// Fetch every record in `ids` with a single query.
    async fn resolve(
        &self,
        ids: BTreeSet<String>,
    ) -> Result<BTreeMap<String, Record>, BuildonomyError> {
        let requested = ids.len();
        let mut filter = Filter::any_id(ids);
        if let Some(tag) = self.config.resolve_tag.as_ref() {
            filter = Filter::AllOf(vec![
                filter,
                Filter::Equals {
                    attribute: TAGS_ATTRIBUTE.to_string(),
                    value: tag.clone(),
                },
            ]);
        }
        let records = self
            .source
            .query(&QueryRequest::configured(filter, &self.config))
            .await?;
        if records.len() < requested {
            tracing::debug!(
                "Resolved {} of {} referenced record(s)",
                records.len(),
                requested
            );
        }
        Ok(records)
    }

    fn publish(&self, report: &ReconcileReport) {
        let Some(tx) = self.events.as_ref() else {
            return;
        };
        let events = report
            .removed
            .iter()
            .cloned()
            .map(AssociationEvent::EdgeRemoved)
            .chain(report.added.iter().cloned().map(AssociationEvent::EdgeAdded))
            .chain(std::iter::once(AssociationEvent::RecordsUpdated(
                report.submitted.clone(),
            )));
        for event in events {
            if let Err(e) = tx.send(event) {
                tracing::warn!(
                    "Association event receiver closed, dropping {} (update already committed)",
                    e.0
                );
                break;
            }
        }
    }
}
