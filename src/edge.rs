use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::properties::{Record, RelationKind};

/// A directed, typed association: `parent --relation--> child` holds when the parent's
/// `relation` attribute lists the child's id.
///
/// An edge carries the record snapshots it was built from, but its identity is only
/// `(parent.id, child.id, relation)` (see [Edge::key]). Two edges discovered through different
/// queries compare equal even when their snapshots disagree on unrelated attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    parent: Record,
    child: Record,
    relation: RelationKind,
}

impl Edge {
    pub fn new(parent: Record, child: Record, relation: RelationKind) -> Self {
        Edge {
            parent,
            child,
            relation,
        }
    }

    /// Build an edge from bare ids. Useful for desired edge sets, where only identity matters.
    pub fn between<P: Into<String>, C: Into<String>>(
        parent_id: P,
        child_id: C,
        relation: RelationKind,
    ) -> Self {
        Edge::new(Record::new(parent_id), Record::new(child_id), relation)
    }

    pub fn parent(&self) -> &Record {
        &self.parent
    }

    pub fn child(&self) -> &Record {
        &self.child
    }

    pub fn parent_id(&self) -> &str {
        &self.parent.id
    }

    pub fn child_id(&self) -> &str {
        &self.child.id
    }

    pub fn relation(&self) -> RelationKind {
        self.relation
    }

    /// Edge identity. Equality, hashing and ordering are all defined over this key and nothing
    /// else.
    pub fn key(&self) -> (&str, &str, RelationKind) {
        (&self.parent.id, &self.child.id, self.relation)
    }

    /// True if either endpoint is the given record.
    pub fn touches(&self, id: &str) -> bool {
        self.parent.id == id || self.child.id == id
    }
}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]-> {}",
            self.parent.id, self.relation, self.child.id
        )
    }
}
