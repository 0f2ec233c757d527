use std::{collections::BTreeMap, future::Future, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{properties::Record, BuildonomyError};

/// A batch of changed records to commit in one call.
///
/// `ids[i]` is the id of `records[i]`. `expected_versions` maps a record id to the version its
/// changes were computed from; a record store that supports versions must reject the whole batch
/// if any stored version differs. Stores without version support ignore it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub ids: Vec<String>,
    pub records: Vec<Record>,
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub expected_versions: BTreeMap<String, String>,
}

impl UpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl FromIterator<Record> for UpdateRequest {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let records: Vec<Record> = iter.into_iter().collect();
        UpdateRequest {
            ids: records.iter().map(|r| r.id.clone()).collect(),
            records,
            expected_versions: BTreeMap::new(),
        }
    }
}

/// The write side of a record store. Commits every record in the request or none of them.
///
/// Failures are [BuildonomyError::BackendUnavailable] when the store can't be reached and
/// [BuildonomyError::UpdateRejected] when it refuses the batch.
pub trait RecordSink: Sync {
    fn update(
        &self,
        request: UpdateRequest,
    ) -> impl Future<Output = Result<(), BuildonomyError>> + Send;
}

impl<T: RecordSink + Send> RecordSink for Arc<T> {
    fn update(
        &self,
        request: UpdateRequest,
    ) -> impl Future<Output = Result<(), BuildonomyError>> + Send {
        self.as_ref().update(request)
    }
}
