use std::{collections::BTreeMap, future::Future, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    config::AssociationConfig,
    properties::{Record, RelationKind},
    BuildonomyError,
};

/// Default query timeout used by the association endpoint.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Filter language understood by a [RecordSource].
///
/// [Filter::matches] is the reference semantics. A record store may evaluate filters however it
/// likes (and may over-match on [Filter::Contains]) as long as every record this function
/// accepts is returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    /// Record id equals the value
    Id(String),
    /// Some string value of the attribute contains the text
    Contains { attribute: String, text: String },
    /// Some string value of the attribute equals the value
    Equals { attribute: String, value: String },
    /// Any sub-filter matches. Empty matches nothing.
    AnyOf(Vec<Filter>),
    /// Every sub-filter matches. Empty matches everything.
    AllOf(Vec<Filter>),
}

impl Filter {
    /// Batch resolution filter: any record whose id is in `ids`.
    pub fn any_id<I, S>(ids: I) -> Filter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::AnyOf(ids.into_iter().map(|id| Filter::Id(id.into())).collect())
    }

    /// Records whose `kind` attribute mentions `text`.
    pub fn mentions(kind: RelationKind, text: &str) -> Filter {
        Filter::Contains {
            attribute: kind.attribute().to_string(),
            text: text.to_string(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Id(id) => record.id == *id,
            Filter::Contains { attribute, text } => record
                .values(attribute)
                .iter()
                .filter_map(toml::Value::as_str)
                .any(|v| v.contains(text.as_str())),
            Filter::Equals { attribute, value } => record
                .values(attribute)
                .iter()
                .filter_map(toml::Value::as_str)
                .any(|v| v == value),
            Filter::AnyOf(filters) => filters.iter().any(|f| f.matches(record)),
            Filter::AllOf(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub filter: Filter,
    pub timeout: Duration,
    /// Fan the query out to every federated source rather than only the local one.
    pub federated: bool,
}

impl QueryRequest {
    pub fn new(filter: Filter) -> Self {
        QueryRequest {
            filter,
            timeout: DEFAULT_QUERY_TIMEOUT,
            federated: true,
        }
    }

    pub fn configured(filter: Filter, config: &AssociationConfig) -> Self {
        QueryRequest {
            filter,
            timeout: config.query_timeout(),
            federated: config.federated,
        }
    }
}

/// The query side of a record store.
///
/// Implementations return every matching record keyed by id. Failures are reported as
/// [BuildonomyError::BackendUnavailable] (unreachable, timed out) or
/// [BuildonomyError::Federation] (some federated source failed). A partial result must never
/// be returned as `Ok`.
pub trait RecordSource: Sync {
    fn query(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<BTreeMap<String, Record>, BuildonomyError>> + Send;
}

impl<T: RecordSource + Send> RecordSource for Arc<T> {
    fn query(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<BTreeMap<String, Record>, BuildonomyError>> + Send {
        self.as_ref().query(request)
    }
}
