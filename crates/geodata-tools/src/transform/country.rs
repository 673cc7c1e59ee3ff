//! Country transformer.

use geodata_proto::Record;
use serde_json::Value as Json;
use tracing::info;

use super::{entries, integer, text, Transformer};
use crate::error::Error;

/// Maps dr5hn countries onto `alpha2Code`, `alpha3Code`, `numericCode`,
/// `name` and `officialName`.
#[derive(Debug, Clone, Default)]
pub struct CountryTransformer;

impl CountryTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for CountryTransformer {
    fn transform(&self, raw: &Json) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();

        for entry in entries(raw)? {
            let entry = entry?;
            let Some(iso2) = text(entry, "iso2") else {
                continue;
            };

            let mut record = Record::new().with("alpha2Code", iso2.into_owned());
            if let Some(iso3) = text(entry, "iso3") {
                record.set("alpha3Code", iso3.into_owned());
            }
            if let Some(code) = integer(entry, "numeric_code") {
                record.set("numericCode", code);
            }

            let name = text(entry, "name");
            if let Some(native) = text(entry, "native") {
                if name.as_deref() != Some(&*native) {
                    record.set("officialName", native.into_owned());
                }
            }
            if let Some(name) = name {
                record.set("name", name.into_owned());
            }

            records.push(record);
        }

        info!(count = records.len(), "transformed countries");
        Ok(records)
    }
}
