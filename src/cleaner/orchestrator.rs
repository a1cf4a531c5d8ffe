//! Orchestrator for the sequential tree walk.

use crate::cleaner::executor::{CleanExecutor, CleanResult};
use crate::cleaner::manifest::{self, manifest_path, workspace_ancestor};
use crate::cleaner::project_scanner::ProjectScanner;
use crate::cleaner::workspace::WorkspaceCoordinator;
use crate::error::Result;
use crate::report;
use humansize::{format_size, BINARY};
use std::path::Path;

/// Summary of a cleaning run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of successfully cleaned projects and workspaces.
    pub cleaned_count: usize,
    /// Number of failed cleanups.
    pub failed_count: usize,
    /// Invalid manifests and workspace members handled by their root.
    pub skipped_count: usize,
    /// Total bytes freed.
    pub total_freed: u64,
}

impl RunSummary {
    pub fn record(&mut self, result: &CleanResult) {
        match result {
            CleanResult::Cleaned { freed_bytes, .. } => {
                self.cleaned_count += 1;
                self.total_freed += freed_bytes;
            }
            CleanResult::Failed { .. } => self.failed_count += 1,
            CleanResult::SkippedInvalid { .. } | CleanResult::SkippedAlreadyHandled { .. } => {
                self.skipped_count += 1
            }
        }
    }

    /// Process exit code: nonzero iff anything failed.
    pub fn exit_code(&self) -> u8 {
        if self.failed_count > 0 {
            1
        } else {
            0
        }
    }
}

/// Walks a tree and dispatches each manifest to the right cleaner.
pub struct CleanOrchestrator {
    scanner: ProjectScanner,
    executor: CleanExecutor,
}

impl CleanOrchestrator {
    /// Create a new orchestrator.
    pub fn new(scanner: ProjectScanner, executor: CleanExecutor) -> Self {
        Self { scanner, executor }
    }

    /// Clean every project under `root` and summarize.
    pub fn run(&self, root: &Path) -> Result<RunSummary> {
        let results = self.clean_all(root)?;
        Ok(Self::summarize(&results))
    }

    /// Clean every project under `root`, one at a time.
    ///
    /// Discovery finishes before the first removal. Locations removed by an
    /// earlier clean are passed over. Stops at the first fatal error.
    pub fn clean_all(&self, root: &Path) -> Result<Vec<CleanResult>> {
        let locations = self.scanner.scan(root);
        let mut results = Vec::with_capacity(locations.len());

        for dir in locations {
            if !manifest_path(&dir).is_file() {
                tracing::debug!(dir = %dir.display(), "Manifest vanished during the walk");
                continue;
            }
            let result = self.clean_location(&dir)?;
            report_result(&result);
            results.push(result);
        }

        Ok(results)
    }

    /// Clean a single manifest location found by the scanner.
    pub fn clean_location(&self, dir: &Path) -> Result<CleanResult> {
        if let Some(owner) = workspace_ancestor(dir) {
            tracing::debug!(dir = %dir.display(), owner = %owner.display(), "Owned by workspace");
            return Ok(CleanResult::SkippedAlreadyHandled {
                path: dir.to_path_buf(),
                owner,
            });
        }

        let is_workspace = manifest::classify(dir).is_ok_and(|c| c.is_workspace());
        if is_workspace {
            report::info(format!("Cleaning workspace {}", dir.display()));
            WorkspaceCoordinator::new(&self.executor).clean_workspace(dir)
        } else {
            report::info(format!("Cleaning {}", dir.display()));
            self.executor.clean(dir)
        }
    }

    /// Get summary statistics from results.
    pub fn summarize(results: &[CleanResult]) -> RunSummary {
        let mut summary = RunSummary::default();
        for result in results {
            summary.record(result);
        }
        summary
    }
}

fn report_result(result: &CleanResult) {
    let path = result.path().display();
    match result {
        CleanResult::Cleaned {
            freed_bytes, note, ..
        } => {
            let freed = format_size(*freed_bytes, BINARY);
            match note {
                Some(note) => report::success(format!("Cleaned {} ({}, {})", path, freed, note)),
                None => report::success(format!("Cleaned {} ({})", path, freed)),
            }
        }
        CleanResult::SkippedInvalid { .. } => report::info(format!(
            "Skipping {}: no [package] or [workspace] section",
            path
        )),
        CleanResult::SkippedAlreadyHandled { owner, .. } => {
            tracing::info!(dir = %path, owner = %owner.display(), "Skipping workspace member")
        }
        CleanResult::Failed { error, .. } => {
            report::error(format!("Failed to clean {}: {}", path, error))
        }
    }
}
