use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use parking_lot::{Mutex, RwLock};

use crate::{
    properties::Record,
    query::{QueryRequest, RecordSource},
    update::{RecordSink, UpdateRequest},
    BuildonomyError,
};

/// In-memory record store implementing both [RecordSource] and [RecordSink].
///
/// Queries evaluate [crate::query::Filter::matches] over every stored record. Updates are
/// all-or-nothing: the batch is validated in full before anything is written. Records may only be
/// updated, not created. Every written record gets its version bumped, and
/// [UpdateRequest::expected_versions] is checked against the stored versions.
///
/// Failures can be scripted with [MemoryStore::fail_query] and [MemoryStore::fail_next_update].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Record>>,
    query_fault: Mutex<Option<(usize, BuildonomyError)>>,
    update_fault: Mutex<Option<BuildonomyError>>,
    queries: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let store = Self::default();
        {
            let mut map = store.records.write();
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        store
    }

    /// Insert or replace a record directly, bypassing update validation.
    pub fn insert(&self, record: Record) {
        self.records.write().insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.records.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Number of queries served, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of update calls received, failed ones included.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Let `skip` queries succeed, then fail the one after with `error`.
    pub fn fail_query(&self, skip: usize, error: BuildonomyError) {
        *self.query_fault.lock() = Some((skip, error));
    }

    pub fn fail_next_update(&self, error: BuildonomyError) {
        *self.update_fault.lock() = Some(error);
    }

    fn take_query_fault(&self) -> Option<BuildonomyError> {
        let mut fault = self.query_fault.lock();
        let (skip, _) = fault.as_mut()?;
        if *skip > 0 {
            *skip -= 1;
            return None;
        }
        fault.take().map(|(_, e)| e)
    }

    fn evaluate(&self, request: &QueryRequest) -> Result<BTreeMap<String, Record>, BuildonomyError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.take_query_fault() {
            tracing::debug!("[MemoryStore] failing query {:?}: {}", request.filter, error);
            return Err(error);
        }
        Ok(self
            .records
            .read()
            .iter()
            .filter(|(_, record)| request.filter.matches(record))
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }

    fn commit(&self, request: UpdateRequest) -> Result<(), BuildonomyError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.update_fault.lock().take() {
            return Err(error);
        }
        if request.ids.len() != request.records.len() {
            return Err(BuildonomyError::UpdateRejected(format!(
                "{} ids supplied for {} records",
                request.ids.len(),
                request.records.len()
            )));
        }

        let mut records = self.records.write();
        for (id, record) in request.ids.iter().zip(request.records.iter()) {
            if *id != record.id {
                return Err(BuildonomyError::UpdateRejected(format!(
                    "Update id '{id}' does not match record id '{}'",
                    record.id
                )));
            }
            let Some(stored) = records.get(id) else {
                return Err(BuildonomyError::UpdateRejected(format!(
                    "Record '{id}' does not exist"
                )));
            };
            if let Some(expected) = request.expected_versions.get(id) {
                if stored.version.as_ref() != Some(expected) {
                    return Err(BuildonomyError::UpdateRejected(format!(
                        "Record '{id}' was modified concurrently: expected version {expected}, \
                         found {:?}",
                        stored.version
                    )));
                }
            }
        }

        for record in request.records {
            let next = records
                .get(&record.id)
                .and_then(|r| r.version.as_ref())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
                + 1;
            let mut record = record;
            record.version = Some(next.to_string());
            records.insert(record.id.clone(), record);
        }
        Ok(())
    }
}

impl RecordSource for MemoryStore {
    async fn query(
        &self,
        request: &QueryRequest,
    ) -> Result<BTreeMap<String, Record>, BuildonomyError> {
        self.evaluate(request)
    }
}

impl RecordSink for MemoryStore {
    async fn update(&self, request: UpdateRequest) -> Result<(), BuildonomyError> {
        self.commit(request)
    }
}
