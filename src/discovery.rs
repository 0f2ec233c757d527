//! Edge discovery: find every association edge that currently touches a root record.
//!
//! Two queries are issued. The first returns the root together with every record that mentions
//! the root's id in one of its relation attributes (candidate parents). The second resolves the
//! ids the root itself lists (children). Edges are then derived from exact matches in the
//! attribute lists; the store's `Contains` evaluation is allowed to over-match.

use std::collections::{BTreeMap, BTreeSet};

use enumset::EnumSet;

use crate::{
    config::AssociationConfig,
    edge::Edge,
    properties::{Record, RelationKind},
    query::{Filter, QueryRequest, RecordSource},
    BuildonomyError,
};

/// Result of [discover]: the root snapshot and every edge with the root at one end.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub root: Record,
    pub edges: BTreeSet<Edge>,
}

impl Discovery {
    /// Edges pointing at the root.
    pub fn parent_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| e.child_id() == self.root.id)
    }

    /// Edges leaving the root.
    pub fn child_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| e.parent_id() == self.root.id)
    }
}

/// `id == root OR related ~ root OR derived ~ root`, restricted to the enabled kinds.
pub fn root_and_parents_filter(root_id: &str, kinds: EnumSet<RelationKind>) -> Filter {
    let parents = Filter::AnyOf(
        kinds
            .iter()
            .map(|kind| Filter::mentions(kind, root_id))
            .collect(),
    );
    Filter::AnyOf(vec![Filter::Id(root_id.to_string()), parents])
}

/// Filter resolving every id the root lists under an enabled relation, or `None` if it lists
/// nothing.
pub fn children_filter(root: &Record, kinds: EnumSet<RelationKind>) -> Option<Filter> {
    let child_ids = root.referenced_ids(kinds);
    if child_ids.is_empty() {
        None
    } else {
        Some(Filter::any_id(child_ids))
    }
}

/// `(parent, root, kind)` for every kind under which a parent lists the root.
pub fn parent_edges<'a, I>(parents: I, root: &Record, kinds: EnumSet<RelationKind>) -> Vec<Edge>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut edges = Vec::new();
    for parent in parents {
        for kind in parent.relations_to(&root.id, kinds) {
            edges.push(Edge::new(parent.clone(), root.clone(), kind));
        }
    }
    edges
}

/// `(root, child, kind)` for every kind under which the root lists a child.
pub fn child_edges<'a, I>(children: I, root: &Record, kinds: EnumSet<RelationKind>) -> Vec<Edge>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut edges = Vec::new();
    for child in children {
        for kind in root.relations_to(&child.id, kinds) {
            edges.push(Edge::new(root.clone(), child.clone(), kind));
        }
    }
    edges
}

/// Discover the current association edges of `root_id`.
///
/// Fails with [BuildonomyError::NotFound] if the root doesn't resolve. Any query error aborts
/// discovery as a whole; a partial edge set is never returned.
#[tracing::instrument(skip(source, config))]
pub async fn discover<S: RecordSource>(
    source: &S,
    config: &AssociationConfig,
    root_id: &str,
) -> Result<Discovery, BuildonomyError> {
    let kinds = config.relations;
    let mut candidates: BTreeMap<String, Record> = source
        .query(&QueryRequest::configured(
            root_and_parents_filter(root_id, kinds),
            config,
        ))
        .await?;

    let root = candidates.remove(root_id).ok_or_else(|| {
        BuildonomyError::NotFound(format!("Association root record '{root_id}' not found"))
    })?;

    let mut edges: BTreeSet<Edge> = parent_edges(candidates.values(), &root, kinds)
        .into_iter()
        .collect();

    if let Some(filter) = children_filter(&root, kinds) {
        let children = source
            .query(&QueryRequest::configured(filter, config))
            .await?;
        let referenced = root.referenced_ids(kinds);
        if let Some(missing) = referenced.iter().find(|id| !children.contains_key(*id)) {
            tracing::debug!(
                "Root {} references '{}', which the record store did not return. \
                 No edge is reported for it.",
                root.id,
                missing
            );
        }
        edges.extend(child_edges(children.values(), &root, kinds));
    }

    tracing::debug!(
        "Discovered {} association edge(s) for {} from {} candidate parent(s)",
        edges.len(),
        root.id,
        candidates.len()
    );
    Ok(Discovery { root, edges })
}
