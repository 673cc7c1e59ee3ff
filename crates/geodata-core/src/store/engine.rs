//! Sled-backed record store.

use geodata_proto::{Record, Value, FIELD_CREATE_DATE, FIELD_ID, FIELD_MODIFY_DATE};
use sled::{Batch, Db, Tree};
use tracing::debug;

use super::codec::{decode_fields, encode_fields};
use super::{current_timestamp, RecordStore, Scope, StorageConfig, StoredRow};
use crate::entity::EntityType;
use crate::error::Error;

/// Fields kept in the row envelope rather than in the encoded data.
const ENVELOPE_FIELDS: [&str; 3] = [FIELD_ID, FIELD_CREATE_DATE, FIELD_MODIFY_DATE];

/// The persisted store wrapping sled.
///
/// Each `{scope}_{table}` lives in its own sled tree, keyed by the
/// big-endian surrogate id so scans come back in insertion order.
pub struct StorageEngine {
    /// The underlying sled database.
    db: Db,
}

impl StorageEngine {
    /// Open or create a store with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        Ok(Self { db })
    }

    /// Check if the database was recovered from a previous crash.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Get one record by id.
    pub fn get(&self, scope: &Scope, entity: EntityType, id: i64) -> Result<Option<Record>, Error> {
        let tree = self.table(scope, entity)?;
        match tree.get(id_key(id))? {
            Some(bytes) => Ok(Some(row_to_record(id, &StoredRow::from_bytes(&bytes)?)?)),
            None => Ok(None),
        }
    }

    /// Number of rows in a table, inactive ones included.
    pub fn count(&self, scope: &Scope, entity: EntityType) -> Result<usize, Error> {
        Ok(self.table(scope, entity)?.len())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// Allocate a fresh surrogate id. Ids start at 1.
    fn next_id(&self) -> Result<i64, Error> {
        let raw = self.db.generate_id()?;
        i64::try_from(raw + 1).map_err(|_| Error::InvalidData("id space exhausted".into()))
    }

    fn table(&self, scope: &Scope, entity: EntityType) -> Result<Tree, Error> {
        Ok(self.db.open_tree(scope.table_name(entity))?)
    }
}

impl RecordStore for StorageEngine {
    fn query_all(&self, scope: &Scope, entity: EntityType) -> Result<Vec<Record>, Error> {
        let tree = self.table(scope, entity)?;
        tree.iter()
            .map(|result| {
                let (key, value) = result?;
                let id = decode_id(&key)?;
                row_to_record(id, &StoredRow::from_bytes(&value)?)
            })
            .collect()
    }

    fn insert_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<Vec<i64>, Error> {
        let tree = self.table(scope, entity)?;
        let now = current_timestamp();
        let mut batch = Batch::default();
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let id = self.next_id()?;
            let row = StoredRow::new(encode_fields(record, &ENVELOPE_FIELDS)?, now);
            batch.insert(&id_key(id)[..], row.to_bytes()?);
            ids.push(id);
        }

        tree.apply_batch(batch)?;
        debug!(table = %scope.table_name(entity), count = ids.len(), "inserted batch");
        Ok(ids)
    }

    fn update_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<usize, Error> {
        let tree = self.table(scope, entity)?;
        let now = current_timestamp();
        let mut batch = Batch::default();

        // Validate every record before anything is written.
        for record in records {
            let id = record.id().ok_or(Error::MissingIdentifier)?;
            let current = tree.get(id_key(id))?.ok_or(Error::UnknownRecord(id))?;
            let row = StoredRow::from_bytes(&current)?
                .rewrite(encode_fields(record, &ENVELOPE_FIELDS)?, now);
            batch.insert(&id_key(id)[..], row.to_bytes()?);
        }

        tree.apply_batch(batch)?;
        debug!(table = %scope.table_name(entity), count = records.len(), "updated batch");
        Ok(records.len())
    }
}

fn id_key(id: i64) -> [u8; 8] {
    id.to_be_bytes()
}

fn decode_id(key: &[u8]) -> Result<i64, Error> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| Error::InvalidKey)?;
    Ok(i64::from_be_bytes(bytes))
}

fn row_to_record(id: i64, row: &StoredRow) -> Result<Record, Error> {
    let mut record = decode_fields(&row.data)?;
    record.set_id(id);
    record.set(FIELD_CREATE_DATE, Value::Timestamp(row.created_at));
    record.set(FIELD_MODIFY_DATE, Value::Timestamp(row.modified_at));
    Ok(record)
}
