//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use geodata_core::{StorageConfig, SyncConfig};
use geodata_tools::AcquireOptions;

use crate::formatter::OutputFormat;

/// Default sled directory.
pub const DEFAULT_DATA_PATH: &str = "./geodata_data";

/// Default directory for acquired snapshots.
pub const DEFAULT_OUTPUT_DIR: &str = "./data";

/// Default page cache size in megabytes.
pub const DEFAULT_CACHE_MB: u64 = 256;

/// Geographic reference data sync.
#[derive(Parser, Debug)]
#[command(name = "geodata")]
#[command(version, about = "Geographic reference data sync", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile a snapshot directory into the store.
    Sync(SyncArgs),
    /// Transform raw dr5hn files into a snapshot directory.
    Acquire(AcquireArgs),
}

#[derive(ClapArgs, Debug)]
pub struct SyncArgs {
    /// Path to the database storage directory.
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Directory holding countries.json, states.json and cities.json.
    #[arg(short, long)]
    pub source_dir: PathBuf,

    /// Dataset namespace; prefixes every table name.
    #[arg(long)]
    pub scope: String,

    /// Skip countries.
    #[arg(long)]
    pub no_countries: bool,

    /// Skip states and provinces.
    #[arg(long)]
    pub no_states: bool,

    /// Skip cities.
    #[arg(long)]
    pub no_cities: bool,

    /// Page cache size in megabytes.
    #[arg(long, default_value_t = DEFAULT_CACHE_MB)]
    pub cache_mb: u64,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

impl SyncArgs {
    /// Convert to storage and sync configuration.
    pub fn into_config(&self) -> (StorageConfig, SyncConfig) {
        let storage = StorageConfig::new(&self.data_path).with_cache_capacity(self.cache_mb * 1024 * 1024);
        let sync = SyncConfig::new(self.scope.clone())
            .with_countries(!self.no_countries)
            .with_state_provinces(!self.no_states)
            .with_cities(!self.no_cities);
        (storage, sync)
    }
}

#[derive(ClapArgs, Debug)]
pub struct AcquireArgs {
    /// Directory holding the raw dr5hn files (cities may be gzipped).
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Only include cities with population >= n.
    #[arg(long)]
    pub min_city_population: Option<i64>,

    /// Comma-separated country codes to include (e.g. US,CA,MX).
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Only write countries.
    #[arg(long, group = "only")]
    pub countries_only: bool,

    /// Only write states.
    #[arg(long, group = "only")]
    pub states_only: bool,

    /// Only write cities.
    #[arg(long, group = "only")]
    pub cities_only: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

impl AcquireArgs {
    /// Convert to acquisition options.
    pub fn into_options(&self) -> AcquireOptions {
        let mut options = AcquireOptions::new();
        if let Some(min) = self.min_city_population {
            options = options.with_min_city_population(min);
        }

        let codes: Vec<&str> = self
            .countries
            .iter()
            .map(|code| code.trim())
            .filter(|code| !code.is_empty())
            .collect();
        if !codes.is_empty() {
            options = options.with_countries(codes);
        }

        options.countries_only = self.countries_only;
        options.states_only = self.states_only;
        options.cities_only = self.cities_only;
        options
    }
}
