//! CLI Commands

pub mod agents;
pub mod config;
pub mod route;
pub mod rules;
pub mod sla;

use desk_engine::HelpdeskEngine;
use std::path::Path;

/// Engine seeded from the resolved config file.
pub fn engine(config_path: Option<&Path>) -> anyhow::Result<HelpdeskEngine> {
    let (config, path) = crate::config::load(config_path)?;
    if let Some(path) = &path {
        tracing::debug!(path = %path.display(), "config loaded");
    }
    Ok(HelpdeskEngine::in_memory(&config)?)
}
