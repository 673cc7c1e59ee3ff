//! Geodata Tools - acquisition of dr5hn snapshots.
//!
//! Raw countries, states and cities arrays are read from a local mirror,
//! mapped into the internal record schema and written as the JSON files
//! the sync source reads.

pub mod acquire;
pub mod error;
pub mod fetch;
pub mod transform;
pub mod writer;

pub use acquire::{acquire, AcquireOptions, AcquireSummary};
pub use error::Error;
pub use fetch::{DirFetcher, Fetcher};
pub use transform::{CityTransformer, CountryFilter, CountryTransformer, StateTransformer, Transformer};
pub use writer::JsonWriter;
