use std::collections::{btree_map::Entry, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{
    diff::EdgeDiff, edge::Edge, properties::Record, update::UpdateRequest, BuildonomyError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeOp {
    Add,
    Remove,
}

/// Accumulates attribute edits for one reconciliation pass.
///
/// `resolved` holds the snapshots fetched once from the record store and is never modified.
/// The first edit to a record clones its snapshot into `changed`; every later edit to the same
/// record lands on that clone, so a parent touched by several edges ends up with all of them.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    resolved: BTreeMap<String, Record>,
    changed: BTreeMap<String, Record>,
}

impl WorkingSet {
    pub fn new(resolved: BTreeMap<String, Record>) -> Self {
        WorkingSet {
            resolved,
            changed: BTreeMap::new(),
        }
    }

    /// Apply one edge edit to its parent record.
    ///
    /// Removing an id the parent doesn't list is a no-op. Adding never deduplicates; callers hand
    /// in deduplicated edge sets. Fails with [BuildonomyError::NotFound] if the parent was not
    /// among the resolved records.
    pub fn apply(&mut self, edge: &Edge, op: EdgeOp) -> Result<(), BuildonomyError> {
        let parent_id = edge.parent_id();
        let target = match self.changed.entry(parent_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let seed = self.resolved.get(parent_id).ok_or_else(|| {
                    BuildonomyError::NotFound(format!(
                        "Cannot apply {op:?} for edge {edge}: parent record '{parent_id}' was not \
                         resolved"
                    ))
                })?;
                entry.insert(seed.clone())
            }
        };

        let attribute = edge.relation().attribute();
        let child_id = edge.child_id();
        let mut values = target.values(attribute).to_vec();
        match op {
            EdgeOp::Remove => {
                if let Some(idx) = values.iter().position(|v| v.as_str() == Some(child_id)) {
                    values.remove(idx);
                } else {
                    tracing::debug!("{edge}: {attribute} does not list the child, nothing to remove");
                }
            }
            EdgeOp::Add => values.push(toml::Value::String(child_id.to_string())),
        }
        target.set_attribute(attribute, values);
        Ok(())
    }

    /// Apply every removal, then every addition.
    pub fn apply_diff(&mut self, diff: &EdgeDiff) -> Result<(), BuildonomyError> {
        for edge in diff.to_remove.iter() {
            self.apply(edge, EdgeOp::Remove)?;
        }
        for edge in diff.to_add.iter() {
            self.apply(edge, EdgeOp::Add)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// Working copy of a touched record.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.changed.get(id)
    }

    /// The snapshot as fetched, before any edit.
    pub fn snapshot(&self, id: &str) -> Option<&Record> {
        self.resolved.get(id)
    }

    pub fn changed_ids(&self) -> impl Iterator<Item = &String> {
        self.changed.keys()
    }

    /// Consume the working set into a single update batch of the touched records. With
    /// `check_versions`, each record's seed version is sent as its expected version.
    pub fn into_update(self, check_versions: bool) -> UpdateRequest {
        let mut request: UpdateRequest = self.changed.into_values().collect();
        if check_versions {
            for id in request.ids.iter() {
                if let Some(version) = self.resolved.get(id).and_then(|r| r.version.clone()) {
                    request.expected_versions.insert(id.clone(), version);
                }
            }
        }
        request
    }
}
