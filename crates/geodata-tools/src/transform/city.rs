//! City transformer.

use geodata_proto::{Record, Value};
use serde_json::Value as Json;
use tracing::{debug, info};

use super::{entries, integer, text, CountryFilter, Transformer};
use crate::error::Error;

/// Maps dr5hn cities onto `countryAlpha2`, `stateCode`, `name`,
/// `population`, `latitude` and `longitude`.
#[derive(Debug, Clone, Default)]
pub struct CityTransformer {
    min_population: Option<i64>,
    country_filter: CountryFilter,
}

impl CityTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cities with a population below `min`. Unknown population counts as 0.
    pub fn with_min_population(mut self, min: Option<i64>) -> Self {
        self.min_population = min;
        self
    }

    /// Keep only cities of the given countries.
    pub fn with_country_filter(mut self, filter: CountryFilter) -> Self {
        self.country_filter = filter;
        self
    }
}

impl Transformer for CityTransformer {
    fn transform(&self, raw: &Json) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();
        let mut skipped_country = 0usize;
        let mut skipped_population = 0usize;

        for entry in entries(raw)? {
            let entry = entry?;
            let country = text(entry, "country_code");

            if let Some(filter) = &self.country_filter {
                if !country.as_deref().is_some_and(|c| filter.contains(c)) {
                    skipped_country += 1;
                    continue;
                }
            }

            let population = integer(entry, "population").unwrap_or(0);
            if let Some(min) = self.min_population {
                if population < min {
                    skipped_population += 1;
                    continue;
                }
            }

            let (Some(country), Some(name)) = (country, text(entry, "name")) else {
                continue;
            };

            let mut record = Record::new()
                .with("countryAlpha2", country.into_owned())
                .with("stateCode", text(entry, "state_code").map(|s| s.into_owned()))
                .with("name", name.into_owned());
            if population > 0 {
                record.set("population", population);
            }
            for field in ["latitude", "longitude"] {
                let Some(raw) = text(entry, field) else {
                    continue;
                };
                match Value::parse_decimal(&raw) {
                    Ok(value) => record.set(field, value),
                    Err(e) => debug!(field, error = %e, "skipping unparseable coordinate"),
                }
            }

            records.push(record);
        }

        info!(
            count = records.len(),
            skipped_country,
            skipped_population,
            "transformed cities"
        );
        Ok(records)
    }
}
