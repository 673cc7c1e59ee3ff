//! Reconciliation of a source snapshot against persisted records.
//!
//! A pass has two halves. [`Reconciler::classify`] is pure: it keys both
//! sides, drains the existing index with the source records, and sorts every
//! record into insert, update or deactivate buckets. [`Reconciler::apply`]
//! then issues at most one insert batch and one update batch against the
//! store.

mod index;

pub use index::{ExistingIndex, SourceSet};

use std::collections::BTreeSet;

use geodata_proto::{Record, FIELD_IS_ACTIVE};
use serde::Serialize;
use tracing::{debug, info};

use crate::entity::EntityDescriptor;
use crate::error::Error;
use crate::store::{RecordStore, Scope};

/// The buckets produced by one classification pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Source records with no stored match, marked active.
    pub to_insert: Vec<Record>,
    /// Source records whose stored match differs or is inactive; they carry
    /// the stored identifier and are marked active.
    pub to_update: Vec<Record>,
    /// Stored records absent from the source that were active, now marked inactive.
    pub to_deactivate: Vec<Record>,
    /// Source records that matched and were unchanged.
    pub unchanged: usize,
    /// Number of source records received, duplicates included.
    pub seen: usize,
    /// Source records discarded because a later one repeated their key.
    pub duplicate_source_keys: usize,
    /// Stored records shadowed by a later one with the same key.
    pub duplicate_existing_keys: usize,
}

impl Classification {
    /// Check if applying this classification would write nothing.
    pub fn is_noop(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_deactivate.is_empty()
    }

    /// Per-bucket counts.
    pub fn counts(&self) -> ReconcileCounts {
        ReconcileCounts {
            seen: self.seen,
            inserted: self.to_insert.len(),
            updated: self.to_update.len(),
            deactivated: self.to_deactivate.len(),
            unchanged: self.unchanged,
            duplicate_source_keys: self.duplicate_source_keys,
            duplicate_existing_keys: self.duplicate_existing_keys,
        }
    }
}

/// Counts reported for one entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileCounts {
    pub seen: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deactivated: usize,
    pub unchanged: usize,
    pub duplicate_source_keys: usize,
    pub duplicate_existing_keys: usize,
}

/// The result of an applied reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// Per-bucket counts.
    pub counts: ReconcileCounts,
    /// The applied buckets; inserted records carry their new identifiers.
    pub classification: Classification,
}

/// Reconciles one entity type, parameterized by its descriptor.
pub struct Reconciler<'a> {
    descriptor: &'a EntityDescriptor,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler for the given entity descriptor.
    pub fn new(descriptor: &'a EntityDescriptor) -> Self {
        Self { descriptor }
    }

    /// Sort `source` against `existing` into insert, update and deactivate buckets.
    pub fn classify(&self, source: Vec<Record>, existing: Vec<Record>) -> Classification {
        let seen = source.len();
        let source = SourceSet::build(self.descriptor, source);
        let mut index = ExistingIndex::build(self.descriptor, existing);

        let mut classification = Classification {
            seen,
            duplicate_source_keys: source.duplicates,
            duplicate_existing_keys: index.duplicates(),
            ..Default::default()
        };

        for (key, mut record) in source.records {
            match index.take(&key) {
                None => {
                    record.set_active(true);
                    classification.to_insert.push(record);
                }
                Some(existing) => {
                    if existing.is_active() && !self.has_changes(&record, &existing) {
                        classification.unchanged += 1;
                        continue;
                    }
                    if let Some(id) = self.descriptor.identifier(&existing) {
                        record.set_id(id);
                    }
                    record.set_active(true);
                    debug!(
                        entity = %self.descriptor.entity,
                        key = %key,
                        reactivated = !existing.is_active(),
                        "record changed"
                    );
                    classification.to_update.push(record);
                }
            }
        }

        for mut orphan in index.into_orphans() {
            if orphan.is_active() {
                orphan.set_active(false);
                classification.to_deactivate.push(orphan);
            }
        }

        classification
    }

    /// Check if any comparable field differs between `source` and `existing`.
    ///
    /// Both field sets are considered, so a field that is set on one side and
    /// absent on the other counts as a change. Exempt fields and the active
    /// flag are ignored.
    pub fn has_changes(&self, source: &Record, existing: &Record) -> bool {
        let fields: BTreeSet<&str> = source.field_names().chain(existing.field_names()).collect();
        fields
            .into_iter()
            .filter(|field| *field != FIELD_IS_ACTIVE && !self.descriptor.is_exempt(field))
            .any(|field| source.get(field) != existing.get(field))
    }

    /// Write a classification to the store.
    ///
    /// Inserts go out as one batch; updates and deactivations share one
    /// update batch. A failed batch aborts the pass with
    /// [`Error::StoreWrite`] and nothing is retried.
    pub fn apply<S: RecordStore>(
        &self,
        store: &S,
        scope: &Scope,
        mut classification: Classification,
    ) -> Result<ReconcileOutcome, Error> {
        let entity = self.descriptor.entity;

        if !classification.to_insert.is_empty() {
            let ids = store
                .insert_batch(scope, entity, &classification.to_insert)
                .map_err(|e| Error::store_write(entity, e))?;
            if ids.len() != classification.to_insert.len() {
                return Err(Error::StoreWrite {
                    entity,
                    reason: format!(
                        "store assigned {} ids for {} inserted records",
                        ids.len(),
                        classification.to_insert.len()
                    ),
                });
            }
            for (record, id) in classification.to_insert.iter_mut().zip(ids) {
                record.set_id(id);
            }
        }

        let writes: Vec<Record> = classification
            .to_update
            .iter()
            .chain(classification.to_deactivate.iter())
            .cloned()
            .collect();
        if !writes.is_empty() {
            store
                .update_batch(scope, entity, &writes)
                .map_err(|e| Error::store_write(entity, e))?;
        }

        Ok(ReconcileOutcome {
            counts: classification.counts(),
            classification,
        })
    }

    /// Classify `source` against `existing` and apply the result.
    pub fn reconcile<S: RecordStore>(
        &self,
        store: &S,
        scope: &Scope,
        source: Vec<Record>,
        existing: Vec<Record>,
    ) -> Result<ReconcileOutcome, Error> {
        let classification = self.classify(source, existing);
        let outcome = self.apply(store, scope, classification)?;

        info!(
            entity = %self.descriptor.entity,
            table = %scope.table_name(self.descriptor.entity),
            seen = outcome.counts.seen,
            inserted = outcome.counts.inserted,
            updated = outcome.counts.updated,
            deactivated = outcome.counts.deactivated,
            unchanged = outcome.counts.unchanged,
            duplicate_source_keys = outcome.counts.duplicate_source_keys,
            duplicate_existing_keys = outcome.counts.duplicate_existing_keys,
            "reconciliation applied"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use geodata_proto::Value;
    use pretty_assertions::assert_eq;

    fn stored(id: i64, code: &str, name: &str, active: bool) -> Record {
        let mut record = Record::new()
            .with("alpha2Code", code)
            .with("name", name)
            .with("createDate", Value::Timestamp(1_000))
            .with("modifyDate", Value::Timestamp(2_000));
        record.set_id(id);
        record.set_active(active);
        record
    }

    fn source(code: &str, name: &str) -> Record {
        Record::new().with("alpha2Code", code).with("name", name)
    }

    #[test]
    fn test_insert_and_unchanged() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "United States"), source("CA", "Canada")],
            vec![stored(1, "US", "United States", true)],
        );

        assert_eq!(
            result.to_insert,
            vec![source("CA", "Canada").with("isActive", true)]
        );
        assert!(result.to_update.is_empty());
        assert!(result.to_deactivate.is_empty());
        assert_eq!(result.unchanged, 1);
        assert_eq!(result.seen, 2);
    }

    #[test]
    fn test_orphan_deactivated() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "United States"), source("CA", "Canada")],
            vec![
                stored(1, "US", "United States", true),
                stored(2, "MX", "Mexico", true),
            ],
        );

        assert_eq!(result.to_deactivate, vec![stored(2, "MX", "Mexico", false)]);
    }

    #[test]
    fn test_custom_exempt_field_suppresses_update() {
        let descriptor = EntityType::Country.descriptor().with_exempt_field("population");
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "United States").with("population", 334_914_895i64)],
            vec![stored(1, "US", "United States", true).with("population", 331_449_281i64)],
        );
        assert!(result.to_update.is_empty());
        assert_eq!(result.unchanged, 1);

        let strict = EntityType::Country.descriptor();
        let result = Reconciler::new(&strict).classify(
            vec![source("US", "United States").with("population", 334_914_895i64)],
            vec![stored(1, "US", "United States", true).with("population", 331_449_281i64)],
        );
        assert_eq!(result.to_update.len(), 1);
    }

    #[test]
    fn test_inactive_orphan_untouched() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(vec![], vec![stored(2, "MX", "Mexico", false)]);
        assert!(result.is_noop());
    }

    #[test]
    fn test_changed_field_carries_id() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "United States of America")],
            vec![stored(1, "US", "United States", true)],
        );

        assert_eq!(result.to_update.len(), 1);
        let update = &result.to_update[0];
        assert_eq!(update.id(), Some(1));
        assert!(update.is_active());
        assert_eq!(update.get("name"), Some(&Value::from("United States of America")));
    }

    #[test]
    fn test_field_removed_is_a_change() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let existing = stored(1, "US", "United States", true).with("officialName", "USA");
        let result = reconciler.classify(vec![source("US", "United States")], vec![existing]);
        assert_eq!(result.to_update.len(), 1);
        assert!(result.to_update[0].get("officialName").is_none());
    }

    #[test]
    fn test_field_added_is_a_change() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "United States").with("numericCode", 840i64)],
            vec![stored(1, "US", "United States", true)],
        );
        assert_eq!(result.to_update.len(), 1);
    }

    #[test]
    fn test_null_equals_absent() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "United States").with("officialName", Value::Null)],
            vec![stored(1, "US", "United States", true)],
        );
        assert!(result.is_noop());
    }

    #[test]
    fn test_exempt_fields_ignored() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let changed_dates = source("US", "United States")
            .with("modifyDate", Value::Timestamp(99_999))
            .with("createDate", Value::Timestamp(5))
            .with("id", 42i64);
        let result = reconciler.classify(vec![changed_dates], vec![stored(1, "US", "United States", true)]);
        assert!(result.is_noop());
        assert_eq!(result.unchanged, 1);
    }

    #[test]
    fn test_reactivation_without_field_change() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("MX", "Mexico")],
            vec![stored(2, "MX", "Mexico", false)],
        );
        assert_eq!(result.to_update.len(), 1);
        assert_eq!(result.to_update[0].id(), Some(2));
        assert!(result.to_update[0].is_active());
    }

    #[test]
    fn test_source_duplicate_does_not_insert_twice() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "Old"), source("US", "United States")],
            vec![stored(1, "US", "United States", true)],
        );
        assert!(result.is_noop());
        assert_eq!(result.duplicate_source_keys, 1);
        assert_eq!(result.seen, 2);
    }

    #[test]
    fn test_empty_source_deactivates_all_active() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![],
            vec![
                stored(1, "US", "United States", true),
                stored(2, "MX", "Mexico", true),
                stored(3, "FR", "France", false),
            ],
        );
        let ids: Vec<_> = result.to_deactivate.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(result.to_deactivate.iter().all(|r| !r.is_active()));
    }

    #[test]
    fn test_counts() {
        let descriptor = EntityType::Country.descriptor();
        let reconciler = Reconciler::new(&descriptor);

        let result = reconciler.classify(
            vec![source("US", "USA"), source("CA", "Canada")],
            vec![stored(1, "US", "United States", true), stored(2, "MX", "Mexico", true)],
        );
        assert_eq!(
            result.counts(),
            ReconcileCounts {
                seen: 2,
                inserted: 1,
                updated: 1,
                deactivated: 1,
                unchanged: 0,
                duplicate_source_keys: 0,
                duplicate_existing_keys: 0,
            }
        );
    }
}
