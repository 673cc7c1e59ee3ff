//! Acquisition error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, transforming or writing snapshots.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A raw snapshot was not valid JSON, or output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A raw snapshot had an unexpected shape.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Record model error.
    #[error("record error: {0}")]
    Record(#[from] geodata_proto::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
