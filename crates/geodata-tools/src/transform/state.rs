//! State and province transformer.

use geodata_proto::Record;
use serde_json::Value as Json;
use tracing::info;

use super::{entries, text, CountryFilter, Transformer};
use crate::error::Error;

/// Maps dr5hn states onto `countryAlpha2`, `code`, `name` and
/// `subdivisionType`.
#[derive(Debug, Clone, Default)]
pub struct StateTransformer {
    country_filter: CountryFilter,
}

impl StateTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only states of the given countries.
    pub fn with_country_filter(mut self, filter: CountryFilter) -> Self {
        self.country_filter = filter;
        self
    }
}

impl Transformer for StateTransformer {
    fn transform(&self, raw: &Json) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();

        for entry in entries(raw)? {
            let entry = entry?;
            let (Some(country), Some(code)) = (text(entry, "country_code"), text(entry, "iso2")) else {
                continue;
            };
            if let Some(filter) = &self.country_filter {
                if !filter.contains(&*country) {
                    continue;
                }
            }

            let mut record = Record::new()
                .with("countryAlpha2", country.into_owned())
                .with("code", code.into_owned());
            if let Some(name) = text(entry, "name") {
                record.set("name", name.into_owned());
            }
            if let Some(kind) = text(entry, "type") {
                record.set("subdivisionType", capitalize(&kind));
            }

            records.push(record);
        }

        info!(count = records.len(), "transformed states/provinces");
        Ok(records)
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
