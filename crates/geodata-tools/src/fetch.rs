//! Raw snapshot retrieval.
//!
//! Snapshots follow the dr5hn countries-states-cities layout. The cities
//! file is commonly shipped gzip-compressed.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::info;

use crate::error::Error;

/// Source of raw dr5hn snapshots.
pub trait Fetcher {
    /// Raw countries array.
    fn fetch_countries(&self) -> Result<serde_json::Value, Error>;

    /// Raw states array.
    fn fetch_states(&self) -> Result<serde_json::Value, Error>;

    /// Raw cities array.
    fn fetch_cities(&self) -> Result<serde_json::Value, Error>;
}

/// Reads raw snapshots from a local directory.
///
/// Each file may also be present with a `.gz` suffix; the plain file wins
/// when both exist.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn fetch(&self, file_name: &str) -> Result<serde_json::Value, Error> {
        let plain = self.dir.join(file_name);
        let gzipped = self.dir.join(format!("{file_name}.gz"));

        let text = if plain.exists() {
            read_plain(&plain)?
        } else if gzipped.exists() {
            read_gzip(&gzipped)?
        } else {
            return Err(Error::InvalidData(format!(
                "neither {} nor {} exists",
                plain.display(),
                gzipped.display()
            )));
        };

        Ok(serde_json::from_str(&text)?)
    }
}

impl Fetcher for DirFetcher {
    fn fetch_countries(&self) -> Result<serde_json::Value, Error> {
        self.fetch("countries.json")
    }

    fn fetch_states(&self) -> Result<serde_json::Value, Error> {
        self.fetch("states.json")
    }

    fn fetch_cities(&self) -> Result<serde_json::Value, Error> {
        self.fetch("cities.json")
    }
}

fn read_plain(path: &Path) -> Result<String, Error> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), bytes = text.len(), "read snapshot");
    Ok(text)
}

fn read_gzip(path: &Path) -> Result<String, Error> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let compressed = file.metadata().map(|m| m.len()).unwrap_or(0);

    let mut text = String::new();
    GzDecoder::new(file)
        .read_to_string(&mut text)
        .map_err(|e| Error::io(path, e))?;

    info!(
        path = %path.display(),
        compressed,
        decompressed = text.len(),
        "read gzip snapshot"
    );
    Ok(text)
}
