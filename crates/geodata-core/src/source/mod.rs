//! Source providers.
//!
//! A provider hands the reconciler a snapshot of one entity type, already
//! shaped into the internal field schema.

mod json;
mod memory;

pub use json::JsonDirSource;
pub use memory::MemorySource;

use geodata_proto::Record;

use crate::entity::EntityType;
use crate::error::Error;

/// Capability to load the source snapshot of one entity type.
pub trait SourceProvider {
    /// Load every source record for `entity`.
    ///
    /// An empty vector is a valid snapshot. Failure to produce records is
    /// reported as [`Error::SourceUnavailable`].
    fn load(&self, entity: EntityType) -> Result<Vec<Record>, Error>;
}

impl<P: SourceProvider + ?Sized> SourceProvider for &P {
    fn load(&self, entity: EntityType) -> Result<Vec<Record>, Error> {
        (**self).load(entity)
    }
}
