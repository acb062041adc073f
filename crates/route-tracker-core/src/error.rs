use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Process memory access is not supported on this platform")]
    UnsupportedPlatform,

    #[error("Routes folder not found")]
    RoutesFolderNotFound,

    #[error("No route files (*.tsv) in {0}")]
    NoRouteFiles(PathBuf),

    #[error("Route file contains no valid entries: {0}")]
    EmptyRoute(PathBuf),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    pub(crate) fn short_read(address: u64, expected: usize, actual: usize) -> Self {
        Error::MemoryReadFailed {
            address,
            message: format!("short read ({} of {} bytes)", actual, expected),
        }
    }
}
