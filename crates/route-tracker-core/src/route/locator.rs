use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Folder name route files live in
pub const ROUTES_DIR_NAME: &str = "Routes";

/// File name fragments that mark a likely route file
pub const ROUTE_FILE_HINTS: &[&str] = &["ac4", "assassin", "route", "main"];

/// Depth of the last-resort search below the home directory
const DEEP_SEARCH_DEPTH: usize = 3;

const SKIPPED_DIRS: &[&str] = &["Windows", "Program Files", "Program Files (x86)", "$Recycle.Bin"];

/// Finds the Routes folder and remembers where it was.
///
/// Search order once the cache misses: the configured folder, a `Routes`
/// folder directly under each root, then under each root's children and
/// grandchildren, then a bounded walk of the home directory.
#[derive(Debug, Clone)]
pub struct RouteLocator {
    configured: Option<PathBuf>,
    roots: Vec<PathBuf>,
    deep_root: Option<PathBuf>,
    cached: Option<PathBuf>,
}

impl RouteLocator {
    /// Locator over the usual places near the executable and in the user profile
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self {
            configured,
            roots: default_roots(),
            deep_root: dirs::home_dir(),
            cached: None,
        }
    }

    /// Locator over explicit roots only
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            configured: None,
            roots,
            deep_root: None,
            cached: None,
        }
    }

    pub fn deep_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.deep_root = Some(path.into());
        self
    }

    pub fn cached(&self) -> Option<&Path> {
        self.cached.as_deref()
    }

    pub fn clear_cache(&mut self) {
        self.cached = None;
    }

    pub fn find_routes_folder(&mut self) -> Result<PathBuf> {
        if let Some(cached) = self.cached.as_ref().filter(|path| path.is_dir()) {
            return Ok(cached.clone());
        }

        let found = self.search().ok_or(Error::RoutesFolderNotFound)?;
        info!("Found Routes folder at {}", found.display());
        self.cached = Some(found.clone());
        Ok(found)
    }

    /// Pick a route file in the Routes folder
    pub fn find_route_file(&mut self) -> Result<PathBuf> {
        let folder = self.find_routes_folder()?;
        let files = list_route_files(&folder)?;
        choose_route_file(&files)
            .cloned()
            .ok_or(Error::NoRouteFiles(folder))
    }

    fn search(&self) -> Option<PathBuf> {
        if let Some(dir) = self.configured.as_ref().filter(|dir| dir.is_dir()) {
            return Some(dir.clone());
        }

        let direct = self
            .roots
            .iter()
            .map(|root| root.join(ROUTES_DIR_NAME))
            .find(|path| path.is_dir());
        if direct.is_some() {
            return direct;
        }

        for root in &self.roots {
            for child in subdirectories(root) {
                let candidate = child.join(ROUTES_DIR_NAME);
                if candidate.is_dir() {
                    return Some(candidate);
                }
                for grandchild in subdirectories(&child) {
                    let candidate = grandchild.join(ROUTES_DIR_NAME);
                    if candidate.is_dir() {
                        return Some(candidate);
                    }
                }
            }
        }

        let deep_root = self.deep_root.as_ref()?;
        debug!("Searching {} for a Routes folder", deep_root.display());
        search_recursive(deep_root, DEEP_SEARCH_DEPTH)
    }
}

fn default_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.extend(exe_dir.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Some(home) = dirs::home_dir() {
        roots.push(home.join("OneDrive"));
        roots.push(home.clone());
    }
    roots.extend(dirs::document_dir());
    roots.extend(dirs::desktop_dir());

    roots
}

/// Readable subdirectories; unreadable ones are skipped
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn is_skipped(dir: &Path) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn search_recursive(dir: &Path, depth: usize) -> Option<PathBuf> {
    if depth == 0 {
        return None;
    }

    let candidate = dir.join(ROUTES_DIR_NAME);
    if candidate.is_dir() {
        return Some(candidate);
    }

    subdirectories(dir)
        .into_iter()
        .filter(|child| !is_skipped(child))
        .find_map(|child| search_recursive(&child, depth - 1))
}

/// `.tsv` files in a folder, sorted by name
pub fn list_route_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// First file whose name carries a route hint, else the first file
pub fn choose_route_file(files: &[PathBuf]) -> Option<&PathBuf> {
    files
        .iter()
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase())
                .is_some_and(|name| ROUTE_FILE_HINTS.iter().any(|hint| name.contains(hint)))
        })
        .or_else(|| files.first())
}
