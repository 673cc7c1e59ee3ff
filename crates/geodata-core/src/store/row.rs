//! Stored row envelope.

use rkyv::{Archive, Deserialize, Serialize};

use crate::error::Error;

/// A persisted row with store-maintained metadata.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct StoredRow {
    /// Codec-encoded fields (everything except id and audit timestamps).
    pub data: Vec<u8>,

    /// Creation timestamp in microseconds since Unix epoch.
    pub created_at: i64,

    /// Last write timestamp in microseconds since Unix epoch.
    pub modified_at: i64,
}

impl StoredRow {
    /// Create a row first written at `now`.
    pub fn new(data: Vec<u8>, now: i64) -> Self {
        Self {
            data,
            created_at: now,
            modified_at: now,
        }
    }

    /// Replace the data, keeping the creation timestamp.
    pub fn rewrite(&self, data: Vec<u8>, now: i64) -> Self {
        Self {
            data,
            created_at: self.created_at,
            modified_at: now,
        }
    }

    /// Serialize the row to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a row from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
