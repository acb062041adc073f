use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::Result;
use crate::export::{format_snapshot_tsv_header, format_snapshot_tsv_row};
use crate::poller::PolledSnapshot;

/// Appends polled snapshots to a per-session TSV file.
///
/// Consecutive snapshots with identical counters are written once.
pub struct SessionLog {
    base_dir: PathBuf,
    current_session: Option<PathBuf>,
    last_written: Option<PolledSnapshot>,
}

impl SessionLog {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            current_session: None,
            last_written: None,
        }
    }

    /// Create `<base>/<date>/session_<time>.tsv` with a header line
    pub fn start_session(&mut self) -> Result<PathBuf> {
        let now: DateTime<Local> = Local::now();
        let session_dir = self.base_dir.join(now.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&session_dir)?;

        let session_file = session_dir.join(format!("session_{}.tsv", now.format("%H%M%S")));
        fs::write(&session_file, format!("{}\n", format_snapshot_tsv_header()))?;
        debug!("Session log: {}", session_file.display());

        self.current_session = Some(session_file.clone());
        self.last_written = None;
        Ok(session_file)
    }

    /// Append a row unless the counters match the last row written.
    ///
    /// Returns whether a row was written.
    pub fn record(&mut self, snapshot: &PolledSnapshot) -> Result<bool> {
        let Some(path) = self.current_session.as_ref() else {
            return Ok(false);
        };
        if self.last_written.as_ref().is_some_and(|last| {
            last.stats.same_counters(&snapshot.stats) && last.activity == snapshot.activity
        }) {
            return Ok(false);
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", format_snapshot_tsv_row(snapshot))?;

        self.last_written = Some(snapshot.clone());
        Ok(true)
    }

    pub fn current_session_path(&self) -> Option<&Path> {
        self.current_session.as_deref()
    }
}
