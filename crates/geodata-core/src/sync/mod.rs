//! Sync runs across the entity hierarchy.

mod config;
mod orchestrator;
mod report;

pub use config::SyncConfig;
pub use orchestrator::SyncOrchestrator;
pub use report::{EntityReport, SyncReport};
