//! Deterministic JSON output of transformed records.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use geodata_proto::Record;
use tracing::info;

use crate::error::Error;

/// Writes sorted, pretty-printed snapshot files into one directory.
#[derive(Debug, Clone)]
pub struct JsonWriter {
    output_dir: PathBuf,
}

impl JsonWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `countries.json`, sorted by `alpha2Code`.
    pub fn write_countries(&self, records: Vec<Record>) -> Result<PathBuf, Error> {
        self.write("countries.json", records, &["alpha2Code"])
    }

    /// Write `states.json`, sorted by `countryAlpha2` then `code`.
    pub fn write_states(&self, records: Vec<Record>) -> Result<PathBuf, Error> {
        self.write("states.json", records, &["countryAlpha2", "code"])
    }

    /// Write `cities.json`, sorted by `countryAlpha2`, `stateCode` then `name`.
    pub fn write_cities(&self, records: Vec<Record>) -> Result<PathBuf, Error> {
        self.write("cities.json", records, &["countryAlpha2", "stateCode", "name"])
    }

    fn write(&self, file_name: &str, mut records: Vec<Record>, sort_by: &[&str]) -> Result<PathBuf, Error> {
        records.sort_by(|a, b| compare_fields(a, b, sort_by));

        let array = records
            .iter()
            .map(Record::to_json)
            .collect::<Result<Vec<_>, _>>()?;
        let mut text = serde_json::to_string_pretty(&array)?;
        text.push('\n');

        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;
        let path = self.output_dir.join(file_name);
        fs::write(&path, text).map_err(|e| Error::io(&path, e))?;

        info!(path = %path.display(), count = records.len(), "wrote snapshot");
        Ok(path)
    }
}

/// Compare records field by field; missing fields sort as the empty string.
fn compare_fields(a: &Record, b: &Record, fields: &[&str]) -> Ordering {
    fields
        .iter()
        .map(|field| {
            let left = a.get(field).map(|v| v.key_text()).unwrap_or_default();
            let right = b.get(field).map(|v| v.key_text()).unwrap_or_default();
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}
