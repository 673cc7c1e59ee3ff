//! Directory of JSON snapshot files.

use std::fs;
use std::path::PathBuf;

use geodata_proto::{records_from_json, Record};
use tracing::debug;

use super::SourceProvider;
use crate::entity::EntityType;
use crate::error::Error;

/// Reads `countries.json`, `states.json` and `cities.json` from a directory.
///
/// Each file holds a JSON array of objects in the internal schema, as
/// written by the acquisition step.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    /// Create a provider reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name holding the snapshot of `entity`.
    pub fn file_name(entity: EntityType) -> &'static str {
        match entity {
            EntityType::Country => "countries.json",
            EntityType::StateProvince => "states.json",
            EntityType::City => "cities.json",
        }
    }

    /// Full path of the snapshot file for `entity`.
    pub fn path_for(&self, entity: EntityType) -> PathBuf {
        self.dir.join(Self::file_name(entity))
    }
}

impl SourceProvider for JsonDirSource {
    fn load(&self, entity: EntityType) -> Result<Vec<Record>, Error> {
        let path = self.path_for(entity);
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::source_unavailable(entity, format!("cannot read {}: {}", path.display(), e))
        })?;
        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            Error::source_unavailable(entity, format!("malformed JSON in {}: {}", path.display(), e))
        })?;
        let records = records_from_json(&json).map_err(|e| {
            Error::source_unavailable(entity, format!("{}: {}", path.display(), e))
        })?;

        debug!(entity = %entity, path = %path.display(), count = records.len(), "loaded source file");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodata_proto::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_countries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("countries.json"),
            r#"[{"alpha2Code": "US", "name": "United States", "numericCode": 840, "officialName": null}]"#,
        )
        .unwrap();

        let records = JsonDirSource::new(dir.path()).load(EntityType::Country).unwrap();
        assert_eq!(
            records,
            vec![Record::new()
                .with("alpha2Code", "US")
                .with("name", "United States")
                .with("numericCode", 840i64)]
        );
    }

    #[test]
    fn test_decimal_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("cities.json"),
            r#"[{"countryAlpha2": "FR", "name": "Lyon", "latitude": 45.75}]"#,
        )
        .unwrap();

        let records = JsonDirSource::new(dir.path()).load(EntityType::City).unwrap();
        assert_eq!(records[0].get("latitude"), Some(&Value::Decimal(4575, 2)));
    }

    #[test]
    fn test_empty_array_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("states.json"), "[]").unwrap();

        let records = JsonDirSource::new(dir.path()).load(EntityType::StateProvince).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonDirSource::new(dir.path()).load(EntityType::City).unwrap_err();
        assert!(matches!(
            err,
            Error::SourceUnavailable { entity: EntityType::City, .. }
        ));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("countries.json"), "[{").unwrap();
        let err = JsonDirSource::new(dir.path()).load(EntityType::Country).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));

        fs::write(dir.path().join("countries.json"), r#"{"alpha2Code": "US"}"#).unwrap();
        let err = JsonDirSource::new(dir.path()).load(EntityType::Country).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
