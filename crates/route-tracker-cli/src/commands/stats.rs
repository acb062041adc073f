//! One-shot stats command.

use std::sync::Arc;

use anyhow::{Context, Result};
use route_tracker_core::{
    ActivityDetector, Poller, ProcessHandle, StatsReader, TrackerConfig, format_snapshot_json,
    format_snapshot_tsv_header, format_snapshot_tsv_row,
};
use tracing::warn;

use crate::cli::OutputFormat;

/// Read every counter once and print it
pub fn run(config: &TrackerConfig, format: OutputFormat) -> Result<()> {
    let process = ProcessHandle::find_and_open(&config.process_name)
        .with_context(|| format!("Is {} running?", config.process_name))?;
    let width = config.pointer_width.unwrap_or(process.pointer_width);

    eprintln!(
        "Found process (PID: {}, Base: 0x{:X}, {})",
        process.pid, process.base_address, width
    );

    let base_address = process.base_address;
    let reader = StatsReader::new(Arc::new(process), base_address, width);
    let mut poller = Poller::new(
        reader,
        ActivityDetector::new(config.activity),
        config.poll_interval(),
    );
    let snapshot = poller.poll_once().context("Poller is not idle")?;

    if !snapshot.stats.unreadable.is_empty() {
        let names: Vec<&str> = snapshot.stats.unreadable.iter().map(|s| s.label()).collect();
        warn!("Unreadable (reported as 0): {}", names.join(", "));
    }

    match format {
        OutputFormat::Tsv => {
            println!("{}", format_snapshot_tsv_header());
            println!("{}", format_snapshot_tsv_row(&snapshot));
        }
        OutputFormat::Json => println!("{}", format_snapshot_json(&snapshot)?),
    }

    Ok(())
}
