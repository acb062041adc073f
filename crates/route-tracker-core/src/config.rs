//! Tracker configuration.
//!
//! Read from a TOML file; every key is optional:
//!
//! ```toml
//! process_name = "AC4BFSP.exe"
//! poll_interval_ms = 1000
//! routes_dir = "C:/Users/me/Documents/Routes"
//! stream_dir = "obs"
//!
//! [activity]
//! legendary_ship = { target = 0.1875, tolerance = 0.00001 }
//! story_mission = { min = 0.66666, max = 1.66668 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activity::ActivityBands;
use crate::error::Result;
use crate::memory::PointerWidth;
use crate::poller::MIN_POLL_INTERVAL;

pub const DEFAULT_PROCESS_NAME: &str = "AC4BFSP.exe";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Executable name of the game process
    pub process_name: String,
    pub poll_interval_ms: u64,
    /// Overrides the detected pointer width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_width: Option<PointerWidth>,
    /// Route file to load instead of searching for one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_file: Option<PathBuf>,
    /// Routes folder checked before the usual locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes_dir: Option<PathBuf>,
    /// Overlay text files are written here when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_dir: Option<PathBuf>,
    /// Snapshot session logs are written here when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
    pub activity: ActivityBands,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            pointer_width: None,
            route_file: None,
            routes_dir: None,
            stream_dir: None,
            session_dir: None,
            activity: ActivityBands::default(),
        }
    }
}

impl TrackerConfig {
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }
}

/// Builder for TrackerConfig
#[derive(Debug, Clone, Default)]
pub struct TrackerConfigBuilder {
    process_name: Option<String>,
    poll_interval_ms: Option<u64>,
    pointer_width: Option<PointerWidth>,
    route_file: Option<PathBuf>,
    routes_dir: Option<PathBuf>,
    stream_dir: Option<PathBuf>,
    session_dir: Option<PathBuf>,
    activity: Option<ActivityBands>,
}

impl TrackerConfigBuilder {
    pub fn process_name<S: Into<String>>(mut self, name: S) -> Self {
        self.process_name = Some(name.into());
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    pub fn pointer_width(mut self, width: PointerWidth) -> Self {
        self.pointer_width = Some(width);
        self
    }

    pub fn route_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.route_file = Some(path.into());
        self
    }

    pub fn routes_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.routes_dir = Some(path.into());
        self
    }

    /// Enable overlay output into this directory
    pub fn stream_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.stream_dir = Some(path.into());
        self
    }

    /// Enable session logging into this directory
    pub fn session_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.session_dir = Some(path.into());
        self
    }

    pub fn activity(mut self, bands: ActivityBands) -> Self {
        self.activity = Some(bands);
        self
    }

    pub fn build(self) -> TrackerConfig {
        let default = TrackerConfig::default();
        TrackerConfig {
            process_name: self.process_name.unwrap_or(default.process_name),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(default.poll_interval_ms),
            pointer_width: self.pointer_width.or(default.pointer_width),
            route_file: self.route_file.or(default.route_file),
            routes_dir: self.routes_dir.or(default.routes_dir),
            stream_dir: self.stream_dir.or(default.stream_dir),
            session_dir: self.session_dir.or(default.session_dir),
            activity: self.activity.unwrap_or(default.activity),
        }
    }
}
