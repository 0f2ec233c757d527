use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::edge::Edge;

/// Emitted by [crate::associated::Associated] after an update batch has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationEvent {
    EdgeRemoved(Edge),
    EdgeAdded(Edge),
    /// Ids of every record written in the batch
    RecordsUpdated(Vec<String>),
}

impl AssociationEvent {
    pub fn edge(&self) -> Option<&Edge> {
        match self {
            AssociationEvent::EdgeRemoved(edge) | AssociationEvent::EdgeAdded(edge) => Some(edge),
            AssociationEvent::RecordsUpdated(_) => None,
        }
    }
}

impl Display for AssociationEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            AssociationEvent::EdgeRemoved(edge) => write!(f, "EdgeRemoved({edge})"),
            AssociationEvent::EdgeAdded(edge) => write!(f, "EdgeAdded({edge})"),
            AssociationEvent::RecordsUpdated(ids) => write!(f, "RecordsUpdated({})", ids.len()),
        }
    }
}
