//! Output formatters for run reports.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use geodata_core::SyncReport;
use geodata_tools::AcquireSummary;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the result of a sync run.
    fn format_sync_report(&self, report: &SyncReport) -> Result<String, serde_json::Error>;

    /// Format the result of an acquisition run.
    fn format_acquire_summary(&self, summary: &AcquireSummary) -> Result<String, serde_json::Error>;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_sync_report(&self, report: &SyncReport) -> Result<String, serde_json::Error> {
        if report.entities.is_empty() {
            return Ok(format!("scope {}: nothing to sync", report.scope));
        }

        let mut table = Table::new();
        table.set_header(vec![
            "entity",
            "seen",
            "inserted",
            "updated",
            "deactivated",
            "dup source",
            "dup existing",
        ]);

        for entity in &report.entities {
            table.add_row(vec![
                Cell::new(entity.entity),
                Cell::new(entity.seen),
                Cell::new(entity.inserted),
                Cell::new(entity.updated),
                Cell::new(entity.deactivated),
                Cell::new(entity.duplicate_source_keys),
                Cell::new(entity.duplicate_existing_keys),
            ]);
        }

        Ok(format!(
            "scope {}\n{}\n{} write(s)",
            report.scope,
            table,
            report.total_writes()
        ))
    }

    fn format_acquire_summary(&self, summary: &AcquireSummary) -> Result<String, serde_json::Error> {
        let mut table = Table::new();
        table.set_header(vec!["file", "records"]);

        for (path, count) in &summary.written {
            table.add_row(vec![Cell::new(path.display()), Cell::new(count)]);
        }

        Ok(table.to_string())
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_sync_report(&self, report: &SyncReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    fn format_acquire_summary(&self, summary: &AcquireSummary) -> Result<String, serde_json::Error> {
        let files: Vec<serde_json::Value> = summary
            .written
            .iter()
            .map(|(path, count)| {
                serde_json::json!({
                    "path": path.display().to_string(),
                    "records": count
                })
            })
            .collect();
        serde_json::to_string_pretty(&files)
    }
}
