//! Dependency-ordered sync across entity types.

use std::collections::BTreeMap;

use tracing::{error, info, info_span};

use super::{EntityReport, SyncConfig, SyncReport};
use crate::entity::{EntityDescriptor, EntityType};
use crate::error::Error;
use crate::reconcile::Reconciler;
use crate::source::SourceProvider;
use crate::store::RecordStore;

/// Runs reconciliation for countries, then states and provinces, then cities.
///
/// Entity types run strictly one after another. A failed source load or
/// store write stops the run before any child entity type is touched.
pub struct SyncOrchestrator<S, P> {
    store: S,
    source: P,
    descriptors: BTreeMap<EntityType, EntityDescriptor>,
}

impl<S: RecordStore, P: SourceProvider> SyncOrchestrator<S, P> {
    /// Create an orchestrator using the built-in entity descriptors.
    pub fn new(store: S, source: P) -> Self {
        let descriptors = EntityType::ALL
            .into_iter()
            .map(|entity| (entity, entity.descriptor()))
            .collect();
        Self {
            store,
            source,
            descriptors,
        }
    }

    /// Replace the descriptor used for one entity type.
    pub fn with_descriptor(mut self, descriptor: EntityDescriptor) -> Self {
        self.descriptors.insert(descriptor.entity, descriptor);
        self
    }

    /// Run one sync pass.
    ///
    /// The configuration and every descriptor in use are validated before
    /// any I/O happens.
    pub fn run(&self, config: &SyncConfig) -> Result<SyncReport, Error> {
        let scope = config.validate()?;
        let entities = config.enabled_entities();

        let mut plan = Vec::with_capacity(entities.len());
        for entity in entities {
            let descriptor = self
                .descriptors
                .get(&entity)
                .ok_or_else(|| Error::Config(format!("no descriptor for {entity}")))?;
            descriptor.validate()?;
            plan.push(descriptor);
        }

        let span = info_span!("sync", scope = %scope);
        let _guard = span.enter();
        info!(entities = plan.len(), "starting sync");

        let mut report = SyncReport::new(scope.as_str());
        for descriptor in plan {
            let entity = descriptor.entity;

            let source = self.source.load(entity).map_err(|e| {
                error!(entity = %entity, error = %e, "source load failed, halting sync");
                match e {
                    already @ Error::SourceUnavailable { .. } => already,
                    other => Error::source_unavailable(entity, other.to_string()),
                }
            })?;
            let existing = self.store.query_all(&scope, entity)?;

            let outcome = Reconciler::new(descriptor)
                .reconcile(&self.store, &scope, source, existing)
                .map_err(|e| {
                    error!(entity = %entity, error = %e, "store write failed, halting sync");
                    e
                })?;

            report.entities.push(EntityReport::new(entity, &outcome.counts));
        }

        info!(writes = report.total_writes(), "sync complete");
        Ok(report)
    }
}
