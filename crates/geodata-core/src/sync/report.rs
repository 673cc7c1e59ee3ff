//! Sync run report.

use serde::Serialize;

use crate::entity::EntityType;
use crate::reconcile::ReconcileCounts;

/// Counts for one reconciled entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReport {
    pub entity: EntityType,
    pub seen: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deactivated: usize,
    pub duplicate_source_keys: usize,
    pub duplicate_existing_keys: usize,
}

impl EntityReport {
    /// Build a report entry from reconciliation counts.
    pub fn new(entity: EntityType, counts: &ReconcileCounts) -> Self {
        Self {
            entity,
            seen: counts.seen,
            inserted: counts.inserted,
            updated: counts.updated,
            deactivated: counts.deactivated,
            duplicate_source_keys: counts.duplicate_source_keys,
            duplicate_existing_keys: counts.duplicate_existing_keys,
        }
    }

    /// Number of records written for this entity type.
    pub fn writes(&self) -> usize {
        self.inserted + self.updated + self.deactivated
    }
}

/// The result of a sync run, one entry per reconciled entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub scope: String,
    pub entities: Vec<EntityReport>,
}

impl SyncReport {
    /// Create an empty report for `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            entities: Vec::new(),
        }
    }

    /// Report entry for one entity type, if it was reconciled.
    pub fn entity(&self, entity: EntityType) -> Option<&EntityReport> {
        self.entities.iter().find(|report| report.entity == entity)
    }

    /// Total records written across all entity types.
    pub fn total_writes(&self) -> usize {
        self.entities.iter().map(EntityReport::writes).sum()
    }
}
