//! Record store gateway.
//!
//! The reconciler only talks to persisted records through [`RecordStore`].
//! Two implementations ship with the crate: the sled-backed
//! [`StorageEngine`] and the in-memory [`MemoryStore`].

mod codec;
mod config;
mod engine;
mod memory;
mod row;

pub use codec::{decode_fields, encode_fields};
pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use memory::MemoryStore;
pub use row::StoredRow;

use std::fmt;

use geodata_proto::Record;

use crate::entity::EntityType;
use crate::error::Error;

/// A validated, non-empty run scope (dataset namespace).
///
/// Every table the store touches is named `{scope}_{table}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    /// Validate a scope token. Empty or blank tokens are a configuration error.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(Error::Config("scope (table name prefix) is required".into()));
        }
        Ok(Scope(trimmed.to_string()))
    }

    /// The scope token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefixed table name for an entity type.
    pub fn table_name(&self, entity: EntityType) -> String {
        format!("{}_{}", self.0, entity.table_name())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability to list and batch-write the records of one table.
///
/// Implementations own surrogate identity: ids are assigned by
/// `insert_batch` and never reassigned.
pub trait RecordStore {
    /// List every record of `entity`, inactive ones included.
    ///
    /// Each record carries its `id` and `isActive` fields.
    fn query_all(&self, scope: &Scope, entity: EntityType) -> Result<Vec<Record>, Error>;

    /// Insert records, assigning a fresh identifier to each.
    ///
    /// Returns the assigned identifiers in input order.
    fn insert_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<Vec<i64>, Error>;

    /// Overwrite existing records by identifier.
    ///
    /// Fails without writing anything if a record has no identifier or the
    /// identifier is unknown. Returns the number of records written.
    fn update_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<usize, Error>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn query_all(&self, scope: &Scope, entity: EntityType) -> Result<Vec<Record>, Error> {
        (**self).query_all(scope, entity)
    }

    fn insert_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<Vec<i64>, Error> {
        (**self).insert_batch(scope, entity, records)
    }

    fn update_batch(
        &self,
        scope: &Scope,
        entity: EntityType,
        records: &[Record],
    ) -> Result<usize, Error> {
        (**self).update_batch(scope, entity, records)
    }
}

/// Current time in microseconds since Unix epoch.
pub fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}
