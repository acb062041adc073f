//! Route inspection command.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use route_tracker_core::{EntryKind, TrackerConfig, load_route_file};

use super::resolve_route_path;

/// Print every entry of a route with the kind its type tag resolved to
pub fn run(config: &TrackerConfig, file: Option<&Path>) -> Result<()> {
    let path = resolve_route_path(config, file)?;
    let checklist = load_route_file(&path)?;

    eprintln!("Route: {} ({} entries)", path.display(), checklist.len());

    let mut unknown = 0;
    for (index, entry) in checklist.entries().iter().enumerate() {
        let kind = entry.kind.to_string();
        let kind = if entry.kind == EntryKind::Unknown {
            unknown += 1;
            format!("{} ({:?})", kind, entry.type_tag).yellow().to_string()
        } else {
            kind
        };
        println!(
            "{:>4}  {}  {} >= {}",
            index + 1,
            entry.display_text(),
            kind.dimmed(),
            entry.threshold
        );
    }

    if unknown > 0 {
        eprintln!(
            "{}",
            format!("{} entries have an unrecognized type and only complete at 100%", unknown)
                .yellow()
        );
    }

    Ok(())
}
