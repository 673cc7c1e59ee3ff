//! Protocol error types.

use thiserror::Error;

/// Errors raised while building or converting records.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A value could not be represented.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
