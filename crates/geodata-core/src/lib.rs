//! Geodata Core - reconciliation engine, record store and sync orchestration.
//!
//! A source snapshot of countries, states and cities is reconciled against
//! the persisted records of a scope. Each pass applies the minimal set of
//! inserts, updates and soft deletes, keeping surrogate identifiers stable
//! across runs.

pub mod entity;
pub mod error;
pub mod key;
pub mod reconcile;
pub mod source;
pub mod store;
pub mod sync;

pub use entity::{EntityDescriptor, EntityType};
pub use error::Error;
pub use key::{NaturalKey, KEY_SEPARATOR};
pub use reconcile::{Classification, ReconcileCounts, ReconcileOutcome, Reconciler};
pub use source::{JsonDirSource, MemorySource, SourceProvider};
pub use store::{MemoryStore, RecordStore, Scope, StorageConfig, StorageEngine};
pub use sync::{EntityReport, SyncConfig, SyncOrchestrator, SyncReport};

/// Re-export record model types.
pub use geodata_proto as proto;
