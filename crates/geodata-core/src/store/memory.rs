//! In-memory record store.

use std::collections::{BTreeMap, HashMap};

use geodata_proto::{Record, Value, FIELD_CREATE_DATE, FIELD_MODIFY_DATE};
use parking_lot::Mutex;

use super::{current_timestamp, RecordStore, Scope};
use crate::entity::EntityType;
use crate::error::Error;

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, BTreeMap<i64, Record>>,
    next_id: i64,
    fail_next_insert: Option<String>,
    fail_next_update: Option<String>,
    query_calls: usize,
    insert_calls: usize,
    update_calls: usize,
}

/// A [`RecordStore`] held entirely in memory.
///
/// Behaves like [`super::StorageEngine`]: ids start at 1 and are never
/// reused, `createDate` survives updates, and a bad update batch writes
/// nothing. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert_batch` call fail with `reason`.
    pub fn fail_next_insert(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next_insert = Some(reason.into());
    }

    /// Make the next `update_batch` call fail with `reason`.
    pub fn fail_next_update(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next_update = Some(reason.into());
    }

    /// Number of `query_all` calls made so far.
    pub fn query_calls(&self) -> usize {
        self.inner.lock().query_calls
    }

    /// Number of `insert_batch` calls made so far.
    pub fn insert_calls(&self) -> usize {
        self.inner.lock().insert_calls
    }

    /// Number of `update_batch` calls made so far.
    pub fn update_calls(&self) -> usize {
        self.inner.lock().update_calls
    }

    /// Get one record by id.
    pub fn get(&self, scope: &Scope, entity: EntityType, id: i64) -> Option<Record> {
        self.inner
            .lock()
            .tables
            .get(&scope.table_name(entity))
            .and_then(|table| table.get(&id).cloned())
    }

    /// Overwrite a stored record without going through the gateway.
    ///
    /// Simulates an external writer touching the store between runs.
    pub fn put_raw(&self, scope: &Scope, entity: EntityType, record: Record) -> Result<(), Error> {
        let id = record.id().ok_or(Error::MissingIdentifier)?;
        let mut inner = self.inner.lock();
        inner.next_id = inner.next_id.max(id);
        inner
            .tables
            .entry(scope.table_name(entity))
            .or_default()
            .insert(id, record);
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn query_all(&self, scope: &Scope, entity: EntityType) -> Result<Vec<Record>, Error> {
        let mut inner = self.inner.lock();
        inner.query_calls += 1;
        Ok(inner
            .tables
            .get(&scope.table_name(entity))
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    fn insert_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<Vec<i64>, Error> {
        let mut inner = self.inner.lock();
        inner.insert_calls += 1;
        if let Some(reason) = inner.fail_next_insert.take() {
            return Err(Error::InvalidData(reason));
        }

        let now = current_timestamp();
        let mut ids = Vec::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            inner.next_id += 1;
            let id = inner.next_id;
            let mut row = record.clone();
            row.set_id(id);
            row.set(FIELD_CREATE_DATE, Value::Timestamp(now));
            row.set(FIELD_MODIFY_DATE, Value::Timestamp(now));
            rows.push((id, row));
            ids.push(id);
        }

        inner
            .tables
            .entry(scope.table_name(entity))
            .or_default()
            .extend(rows);
        Ok(ids)
    }

    fn update_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<usize, Error> {
        let mut inner = self.inner.lock();
        inner.update_calls += 1;
        if let Some(reason) = inner.fail_next_update.take() {
            return Err(Error::InvalidData(reason));
        }

        let now = current_timestamp();
        let table = inner.tables.entry(scope.table_name(entity)).or_default();

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id().ok_or(Error::MissingIdentifier)?;
            let current = table.get(&id).ok_or(Error::UnknownRecord(id))?;
            let mut row = record.clone();
            row.set(
                FIELD_CREATE_DATE,
                current.get(FIELD_CREATE_DATE).cloned().unwrap_or(Value::Null),
            );
            row.set(FIELD_MODIFY_DATE, Value::Timestamp(now));
            rows.push((id, row));
        }

        let written = rows.len();
        table.extend(rows);
        Ok(written)
    }
}
