use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
};

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::BuildonomyError;

/// Attribute holding the tags a record store uses to classify records (e.g. "resource").
pub const TAGS_ATTRIBUTE: &str = "metacard-tags";

/// Prefix shared by every association attribute name.
pub const ASSOCIATION_PREFIX: &str = "metacard.associations.";

/// [RelationKind] enumerates the association types this crate understands. A parent record
/// asserts `parent --kind--> child` by listing the child's id in the attribute named by
/// [RelationKind::attribute].
///
/// Discovery and mutation both dispatch on this enum. There is no free-form relation name.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[serde(rename_all = "lowercase")]
#[enumset(serialize_repr = "list")]
pub enum RelationKind {
    /// Loosely related records
    Related,
    /// The child was derived from the parent
    Derived,
}

impl RelationKind {
    pub fn all() -> &'static [RelationKind] {
        &[RelationKind::Related, RelationKind::Derived]
    }

    /// Name of the record attribute carrying the outbound ids for this relation.
    pub fn attribute(&self) -> &'static str {
        match self {
            RelationKind::Related => "metacard.associations.related",
            RelationKind::Derived => "metacard.associations.derived",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            RelationKind::Related => write!(f, "RELATED"),
            RelationKind::Derived => write!(f, "DERIVED"),
        }
    }
}

impl TryFrom<&str> for RelationKind {
    type Error = BuildonomyError;

    fn try_from(src: &str) -> Result<RelationKind, BuildonomyError> {
        let lowered = src.to_lowercase();
        match lowered.strip_prefix(ASSOCIATION_PREFIX).unwrap_or(lowered.as_str()) {
            "related" => Ok(RelationKind::Related),
            "derived" => Ok(RelationKind::Derived),
            _ => Err(BuildonomyError::Custom(format!(
                "Invalid str for RelationKind. Received {src}. Valid options: related, derived"
            ))),
        }
    }
}

/// A record as seen by the association logic: an id plus named, ordered, multi-valued
/// attributes.
///
/// Records handed out by a [crate::query::RecordSource] are snapshots. Mutation always happens
/// on a clone held by [crate::accumulator::WorkingSet], never on the fetched value.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<toml::Value>>,
    /// Opaque concurrency token assigned by the record store, if it supports one.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Record {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Record {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute<S: Into<String>>(mut self, name: S, values: Vec<toml::Value>) -> Self {
        self.attributes.insert(name.into(), values);
        self
    }

    pub fn with_relation<S: ToString>(mut self, kind: RelationKind, ids: &[S]) -> Self {
        self.set_strings(
            kind.attribute(),
            ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// All values of an attribute, or an empty slice when the attribute is absent.
    pub fn values(&self, name: &str) -> &[toml::Value] {
        self.attributes
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The string values of an attribute in order. Non-string values are skipped.
    pub fn strings(&self, name: &str) -> Vec<String> {
        self.values(name)
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn set_attribute<S: Into<String>>(&mut self, name: S, values: Vec<toml::Value>) {
        self.attributes.insert(name.into(), values);
    }

    pub fn set_strings<S: Into<String>>(&mut self, name: S, values: Vec<String>) {
        self.set_attribute(name, values.into_iter().map(toml::Value::String).collect());
    }

    /// Ids this record lists under the given relation.
    pub fn relation_ids(&self, kind: RelationKind) -> Vec<String> {
        self.strings(kind.attribute())
    }

    /// True if this record's `kind` list holds `id` exactly.
    pub fn references(&self, kind: RelationKind, id: &str) -> bool {
        self.values(kind.attribute())
            .iter()
            .any(|v| v.as_str() == Some(id))
    }

    /// Every relation kind in `kinds` under which this record lists `id`.
    pub fn relations_to(&self, id: &str, kinds: EnumSet<RelationKind>) -> Vec<RelationKind> {
        kinds
            .iter()
            .filter(|kind| self.references(*kind, id))
            .collect()
    }

    /// Union of all ids referenced under the given relation kinds.
    pub fn referenced_ids(&self, kinds: EnumSet<RelationKind>) -> BTreeSet<String> {
        kinds
            .iter()
            .flat_map(|kind| self.relation_ids(kind))
            .collect()
    }
}
