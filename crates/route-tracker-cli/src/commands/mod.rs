//! CLI command implementations.

pub mod route;
pub mod stats;
pub mod tracking;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use route_tracker_core::{RouteLocator, TrackerConfig};

/// Route file to use: the explicit one, the configured one, or a search
pub fn resolve_route_path(config: &TrackerConfig, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit.or(config.route_file.as_deref()) {
        return Ok(path.to_path_buf());
    }

    let mut locator = RouteLocator::new(config.routes_dir.clone());
    locator
        .find_route_file()
        .context("Create a 'Routes' folder with a .tsv route file, or pass --route")
}
