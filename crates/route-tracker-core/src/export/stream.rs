use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::poller::PolledSnapshot;
use crate::route::Checklist;

/// Text files for streaming overlays
pub struct StreamOutput {
    enabled: bool,
    base_dir: PathBuf,
}

impl StreamOutput {
    pub fn new<P: Into<PathBuf>>(enabled: bool, base_dir: P) -> Self {
        Self {
            enabled,
            base_dir: base_dir.into(),
        }
    }

    /// Output into `dir` when set, otherwise disabled
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::new(true, dir),
            None => Self::new(false, PathBuf::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn write_percent(&self, percent_float: f32) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.write_file("percent.txt", &format!("{:.2}%", percent_float))
    }

    pub fn write_progress(&self, checklist: &Checklist) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let (done, total) = checklist.progress();
        self.write_file("progress.txt", &format!("{}/{}", done, total))?;

        let next = checklist
            .next_incomplete()
            .map(|entry| entry.display_text())
            .unwrap_or_default();
        self.write_file("next.txt", &next)
    }

    pub fn write_activity(&self, snapshot: &PolledSnapshot) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let activity = &snapshot.activity;
        self.write_file("story.txt", &activity.story_missions.to_string())?;
        self.write_file("templar.txt", &activity.templar_hunts.to_string())?;
        self.write_file("legendary.txt", &activity.legendary_ships.to_string())
    }

    /// Clear every overlay file
    pub fn clear(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        for name in [
            "percent.txt",
            "progress.txt",
            "next.txt",
            "story.txt",
            "templar.txt",
            "legendary.txt",
        ] {
            self.write_file(name, "")?;
        }
        Ok(())
    }

    fn write_file(&self, filename: &str, content: &str) -> Result<()> {
        fs::write(self.base_dir.join(filename), content)?;
        Ok(())
    }
}
