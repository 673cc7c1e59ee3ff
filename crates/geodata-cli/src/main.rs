//! Geodata Command-Line Interface
//!
//! `geodata acquire` turns raw dr5hn files into a snapshot directory;
//! `geodata sync` reconciles a snapshot directory into the store.

mod config;
mod formatter;

use clap::Parser;
use config::{AcquireArgs, Args, Command, SyncArgs};
use geodata_core::{JsonDirSource, StorageEngine, SyncOrchestrator};
use geodata_tools::{DirFetcher, JsonWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geodata=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Sync(sync) => run_sync(&sync),
        Command::Acquire(acquire) => run_acquire(&acquire),
    }
}

/// Reconcile a snapshot directory into the sled store.
fn run_sync(args: &SyncArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (storage_config, sync_config) = args.into_config();
    // Fail on a bad scope before the store is opened.
    sync_config.validate()?;

    info!(path = %storage_config.path.display(), "opening store");
    let store = StorageEngine::open(storage_config)?;
    if store.was_recovered() {
        info!("recovered existing database");
    }

    let source = JsonDirSource::new(&args.source_dir);
    let report = SyncOrchestrator::new(&store, source).run(&sync_config)?;
    store.flush()?;

    println!("{}", formatter::create_formatter(args.format).format_sync_report(&report)?);
    Ok(())
}

/// Transform raw dr5hn files into a snapshot directory.
fn run_acquire(args: &AcquireArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = DirFetcher::new(&args.input_dir);
    let writer = JsonWriter::new(&args.output_dir);
    let summary = geodata_tools::acquire(&fetcher, &writer, &args.into_options())?;

    println!("{}", formatter::create_formatter(args.format).format_acquire_summary(&summary)?);
    Ok(())
}
