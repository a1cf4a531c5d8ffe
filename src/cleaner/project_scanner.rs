//! Project scanner for discovering manifests in a directory tree.

use crate::cleaner::manifest::{manifest_path, ARTIFACT_DIR};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Options for scanning.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory names pruned from the walk.
    pub exclude_patterns: Vec<String>,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

/// Scanner for discovering Cargo projects in a directory tree.
pub struct ProjectScanner {
    options: ScanOptions,
}

impl ProjectScanner {
    /// Create a new scanner with the given options.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Every directory under `root` (including `root`) holding a manifest.
    ///
    /// The walk is unbounded in depth and ordered by file name, so parents
    /// always come before their children. A project's `target/` directory is
    /// never entered.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let walker = WalkDir::new(root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !(self.is_excluded(e) || is_build_output(e))
            });

        let mut locations = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping unreadable entry");
                    continue;
                }
            };

            if entry.file_type().is_dir() && manifest_path(entry.path()).is_file() {
                locations.push(entry.into_path());
            }
        }

        tracing::debug!(root = %root.display(), found = locations.len(), "Scan complete");
        locations
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.options
            .exclude_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }
}

/// Artifact directory of a project, e.g. left behind by `cargo package`.
fn is_build_output(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.file_name() == OsStr::new(ARTIFACT_DIR)
        && entry
            .path()
            .parent()
            .is_some_and(|parent| manifest_path(parent).is_file())
}
