//! In-memory source provider.

use std::collections::HashMap;

use geodata_proto::Record;

use super::SourceProvider;
use crate::entity::EntityType;
use crate::error::Error;

/// Snapshots held in memory, keyed by entity type.
///
/// An entity with no snapshot loads as empty unless it was marked
/// unavailable.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshots: HashMap<EntityType, Vec<Record>>,
    unavailable: HashMap<EntityType, String>,
}

impl MemorySource {
    /// Create a provider with no snapshots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot for an entity type.
    pub fn with(mut self, entity: EntityType, records: Vec<Record>) -> Self {
        self.snapshots.insert(entity, records);
        self
    }

    /// Replace the snapshot for an entity type.
    pub fn set(&mut self, entity: EntityType, records: Vec<Record>) {
        self.snapshots.insert(entity, records);
    }

    /// Make loading `entity` fail with `reason`.
    pub fn with_unavailable(mut self, entity: EntityType, reason: impl Into<String>) -> Self {
        self.unavailable.insert(entity, reason.into());
        self
    }
}

impl SourceProvider for MemorySource {
    fn load(&self, entity: EntityType) -> Result<Vec<Record>, Error> {
        if let Some(reason) = self.unavailable.get(&entity) {
            return Err(Error::source_unavailable(entity, reason.clone()));
        }
        Ok(self.snapshots.get(&entity).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_snapshot_is_empty() {
        let source = MemorySource::new().with(EntityType::Country, vec![Record::new().with("alpha2Code", "US")]);
        assert_eq!(source.load(EntityType::Country).unwrap().len(), 1);
        assert!(source.load(EntityType::City).unwrap().is_empty());
    }

    #[test]
    fn test_unavailable() {
        let source = MemorySource::new().with_unavailable(EntityType::City, "feed offline");
        let err = source.load(EntityType::City).unwrap_err();
        assert!(err.to_string().contains("feed offline"));
    }
}
