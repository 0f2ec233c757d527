use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::edge::Edge;

/// Edges to remove and edges to add in order to move from one edge set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDiff {
    pub to_remove: BTreeSet<Edge>,
    pub to_add: BTreeSet<Edge>,
}

impl EdgeDiff {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Every edge the diff will touch, removals first.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.to_remove.iter().chain(self.to_add.iter())
    }
}

/// `(old − new, new − old)` under edge identity. Edges present in both sets are left out.
pub fn diff(old_edges: &BTreeSet<Edge>, new_edges: &BTreeSet<Edge>) -> EdgeDiff {
    EdgeDiff {
        to_remove: old_edges.difference(new_edges).cloned().collect(),
        to_add: new_edges.difference(old_edges).cloned().collect(),
    }
}
