//! The acquisition pipeline: fetch, transform, write.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::info;

use crate::error::Error;
use crate::fetch::Fetcher;
use crate::transform::{CityTransformer, CountryFilter, CountryTransformer, StateTransformer, Transformer};
use crate::writer::JsonWriter;

/// Options for one acquisition run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireOptions {
    /// Drop cities below this population.
    pub min_city_population: Option<i64>,

    /// Keep only states and cities of these countries. Countries are never filtered.
    pub country_filter: CountryFilter,

    /// Only produce countries.
    pub countries_only: bool,

    /// Only produce states and provinces.
    pub states_only: bool,

    /// Only produce cities.
    pub cities_only: bool,
}

impl AcquireOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_city_population(mut self, min: i64) -> Self {
        self.min_city_population = Some(min);
        self
    }

    /// Restrict states and cities to the given country codes.
    pub fn with_countries<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: BTreeSet<String> = codes.into_iter().map(Into::into).collect();
        self.country_filter = Some(codes);
        self
    }

    pub fn countries_only(mut self) -> Self {
        self.countries_only = true;
        self
    }

    pub fn states_only(mut self) -> Self {
        self.states_only = true;
        self
    }

    pub fn cities_only(mut self) -> Self {
        self.cities_only = true;
        self
    }

    pub fn include_countries(&self) -> bool {
        !self.states_only && !self.cities_only
    }

    pub fn include_states(&self) -> bool {
        !self.countries_only && !self.cities_only
    }

    pub fn include_cities(&self) -> bool {
        !self.countries_only && !self.states_only
    }
}

/// Files written by an acquisition run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireSummary {
    /// `(path, record count)` per written file, in write order.
    pub written: Vec<(PathBuf, usize)>,
}

/// Fetch, transform and write every selected snapshot.
pub fn acquire<F: Fetcher>(fetcher: &F, writer: &JsonWriter, options: &AcquireOptions) -> Result<AcquireSummary, Error> {
    info!(
        output_dir = %writer.output_dir().display(),
        min_city_population = ?options.min_city_population,
        country_filter = ?options.country_filter,
        "starting acquisition"
    );

    let mut summary = AcquireSummary::default();

    if options.include_countries() {
        let records = CountryTransformer::new().transform(&fetcher.fetch_countries()?)?;
        let count = records.len();
        summary.written.push((writer.write_countries(records)?, count));
    }

    if options.include_states() {
        let records = StateTransformer::new()
            .with_country_filter(options.country_filter.clone())
            .transform(&fetcher.fetch_states()?)?;
        let count = records.len();
        summary.written.push((writer.write_states(records)?, count));
    }

    if options.include_cities() {
        let records = CityTransformer::new()
            .with_min_population(options.min_city_population)
            .with_country_filter(options.country_filter.clone())
            .transform(&fetcher.fetch_cities()?)?;
        let count = records.len();
        summary.written.push((writer.write_cities(records)?, count));
    }

    info!(files = summary.written.len(), "acquisition complete");
    Ok(summary)
}
