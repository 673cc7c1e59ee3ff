//! Natural-key indexes over source and existing records.

use std::collections::HashMap;

use geodata_proto::Record;
use tracing::warn;

use crate::entity::EntityDescriptor;
use crate::key::NaturalKey;

/// Existing records indexed by natural key.
///
/// The index is owned by one reconciliation pass. Matches are removed with
/// [`ExistingIndex::take`] as source records consume them; whatever is left
/// when the pass ends is returned by [`ExistingIndex::into_orphans`].
#[derive(Debug, Default)]
pub struct ExistingIndex {
    by_key: HashMap<NaturalKey, Record>,
    duplicates: usize,
}

impl ExistingIndex {
    /// Index `records` by their natural key. Later duplicates replace earlier ones.
    pub fn build(descriptor: &EntityDescriptor, records: Vec<Record>) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        let mut duplicates = 0;

        for record in records {
            let key = NaturalKey::build(&record, &descriptor.key_fields);
            if let Some(replaced) = by_key.insert(key.clone(), record) {
                duplicates += 1;
                warn!(
                    entity = %descriptor.entity,
                    key = %key,
                    replaced_id = ?replaced.id(),
                    "duplicate natural key in stored records"
                );
            }
        }

        Self { by_key, duplicates }
    }

    /// Remove and return the record stored under `key`.
    pub fn take(&mut self, key: &NaturalKey) -> Option<Record> {
        self.by_key.remove(key)
    }

    /// Number of records still indexed.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Check if every indexed record has been consumed.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Number of stored records dropped because their key repeated.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Consume the index, returning the unmatched records ordered by key.
    pub fn into_orphans(self) -> Vec<Record> {
        let mut orphans: Vec<(NaturalKey, Record)> = self.by_key.into_iter().collect();
        orphans.sort_by(|a, b| a.0.cmp(&b.0));
        orphans.into_iter().map(|(_, record)| record).collect()
    }
}

/// Source records keyed and de-duplicated.
#[derive(Debug, Default)]
pub struct SourceSet {
    /// Surviving records in the order their last occurrence appeared.
    pub records: Vec<(NaturalKey, Record)>,
    /// Number of records discarded because a later record repeated their key.
    pub duplicates: usize,
}

impl SourceSet {
    /// Key `records`, keeping only the last occurrence of each key.
    pub fn build(descriptor: &EntityDescriptor, records: Vec<Record>) -> Self {
        let mut slots: Vec<Option<(NaturalKey, Record)>> = Vec::with_capacity(records.len());
        let mut positions: HashMap<NaturalKey, usize> = HashMap::with_capacity(records.len());
        let mut duplicates = 0;

        for record in records {
            let key = NaturalKey::build(&record, &descriptor.key_fields);
            if let Some(previous) = positions.insert(key.clone(), slots.len()) {
                slots[previous] = None;
                duplicates += 1;
                warn!(
                    entity = %descriptor.entity,
                    key = %key,
                    "duplicate natural key in source snapshot"
                );
            }
            slots.push(Some((key, record)));
        }

        Self {
            records: slots.into_iter().flatten().collect(),
            duplicates,
        }
    }
}
