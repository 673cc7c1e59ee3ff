//! Core error types.

use thiserror::Error;

use crate::entity::EntityType;

/// Core reconciliation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid run configuration, raised before any I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// The source provider could not produce records for an entity type.
    #[error("source unavailable for {entity}: {reason}")]
    SourceUnavailable { entity: EntityType, reason: String },

    /// A batch insert or update failed; the run must not continue.
    #[error("store write failed for {entity}: {reason}")]
    StoreWrite { entity: EntityType, reason: String },

    /// An update record did not carry a surrogate identifier.
    #[error("record is missing its identifier")]
    MissingIdentifier,

    /// An update record referenced an identifier the store does not hold.
    #[error("unknown record id {0}")]
    UnknownRecord(i64),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Record model error.
    #[error("protocol error: {0}")]
    Protocol(#[from] geodata_proto::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Wrap a gateway failure as a fatal store-write error.
    pub fn store_write(entity: EntityType, source: Error) -> Self {
        match source {
            already @ Error::StoreWrite { .. } => already,
            other => Error::StoreWrite {
                entity,
                reason: other.to_string(),
            },
        }
    }

    /// Wrap a provider failure as a source-unavailable error.
    pub fn source_unavailable(entity: EntityType, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            entity,
            reason: reason.into(),
        }
    }

    /// Check if this error was raised before any I/O happened.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
