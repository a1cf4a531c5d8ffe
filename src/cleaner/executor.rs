//! Executor for cleaning a single project directory.

use crate::cleaner::diagnostics::{classify_failure, FailureKind};
use crate::cleaner::manifest::{self, artifact_dir, Classification, ARTIFACT_DIR};
use crate::cleaner::tool::{CleanMode, CleanTool};
use crate::error::Result;
use crate::report;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of a clean operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanResult {
    /// Artifacts are gone, or there were none.
    Cleaned {
        path: PathBuf,
        freed_bytes: u64,
        /// Caveat about how the result was reached.
        note: Option<String>,
    },
    /// The manifest declares neither a package nor a workspace.
    SkippedInvalid { path: PathBuf },
    /// The directory belongs to a workspace cleaned from its root.
    SkippedAlreadyHandled { path: PathBuf, owner: PathBuf },
    /// Cleaning failed.
    Failed { path: PathBuf, error: String },
}

impl CleanResult {
    pub fn path(&self) -> &Path {
        match self {
            CleanResult::Cleaned { path, .. }
            | CleanResult::SkippedInvalid { path }
            | CleanResult::SkippedAlreadyHandled { path, .. }
            | CleanResult::Failed { path, .. } => path,
        }
    }

    /// Everything except `Failed` counts as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, CleanResult::Failed { .. })
    }
}

/// Options for the clean executor.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Retry with `clean --offline` after the default invocation and direct
    /// removal fail.
    pub offline_retry: bool,
    /// Retry with `clean --release` after that.
    pub release_retry: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            offline_retry: true,
            release_retry: true,
        }
    }
}

/// One step of the fallback cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Tool(CleanMode),
    RemoveArtifacts,
}

enum Attempt {
    Done,
    NotApplicable,
    Failed(String),
}

/// Executor for cleaning project artifacts.
pub struct CleanExecutor {
    tool: Box<dyn CleanTool>,
    options: CleanOptions,
}

impl CleanExecutor {
    /// Create a new executor with the given tool and options.
    pub fn new(tool: Box<dyn CleanTool>, options: CleanOptions) -> Self {
        Self { tool, options }
    }

    pub fn tool(&self) -> &dyn CleanTool {
        self.tool.as_ref()
    }

    fn strategies(&self) -> Vec<Strategy> {
        let mut strategies = vec![Strategy::Tool(CleanMode::Default), Strategy::RemoveArtifacts];
        if self.options.offline_retry {
            strategies.push(Strategy::Tool(CleanMode::Offline));
        }
        if self.options.release_retry {
            strategies.push(Strategy::Tool(CleanMode::Release));
        }
        strategies
    }

    /// Clean a single project directory.
    ///
    /// Strategies are tried in order until one succeeds; when all fail the
    /// tool output is classified to decide whether direct removal is safe.
    /// `Err` means the directory could not be entered and the run must stop.
    pub fn clean(&self, dir: &Path) -> Result<CleanResult> {
        match manifest::classify(dir) {
            Ok(Classification::Invalid) => {
                tracing::debug!(dir = %dir.display(), "No package or workspace section");
                return Ok(CleanResult::SkippedInvalid {
                    path: dir.to_path_buf(),
                });
            }
            Ok(Classification::Manifest(_)) => {}
            Err(e) => {
                return Ok(CleanResult::Failed {
                    path: dir.to_path_buf(),
                    error: e.to_string(),
                })
            }
        }

        let size_before = dir_size(&artifact_dir(dir));
        let mut removal_error = None;

        for strategy in self.strategies() {
            match self.attempt(dir, strategy)? {
                Attempt::Done => return Ok(cleaned(dir, size_before, None)),
                Attempt::NotApplicable => {}
                Attempt::Failed(error) => {
                    tracing::debug!(dir = %dir.display(), ?strategy, %error, "Clean strategy failed");
                    if strategy == Strategy::RemoveArtifacts {
                        report::warning(format!(
                            "Could not remove {}: {}",
                            artifact_dir(dir).display(),
                            error
                        ));
                        removal_error = Some(error);
                    }
                }
            }
        }

        self.diagnose(dir, size_before, removal_error)
    }

    fn attempt(&self, dir: &Path, strategy: Strategy) -> Result<Attempt> {
        Ok(match strategy {
            Strategy::Tool(mode) => {
                let output = self.tool.run(dir, mode)?;
                if output.success {
                    Attempt::Done
                } else {
                    Attempt::Failed(first_line(&output.diagnostics))
                }
            }
            Strategy::RemoveArtifacts => {
                if !artifact_dir(dir).exists() {
                    Attempt::NotApplicable
                } else {
                    match remove_artifacts(dir) {
                        Ok(_) => Attempt::Done,
                        Err(e) => Attempt::Failed(e.to_string()),
                    }
                }
            }
        })
    }

    /// Last resort: capture the tool's complaint and decide whether the
    /// project is only suffering from workspace breakage.
    fn diagnose(
        &self,
        dir: &Path,
        size_before: u64,
        removal_error: Option<String>,
    ) -> Result<CleanResult> {
        let output = self.tool.run(dir, CleanMode::Default)?;
        if output.success {
            return Ok(cleaned(dir, size_before, None));
        }

        match classify_failure(&output.diagnostics) {
            FailureKind::WorkspaceIssue { cause } => {
                report::warning(format!("{}: {}", dir.display(), cause));
                if !artifact_dir(dir).exists() {
                    return Ok(cleaned(
                        dir,
                        size_before,
                        Some(format!("{}; nothing to remove", cause)),
                    ));
                }
                Ok(match remove_artifacts(dir) {
                    Ok(_) => cleaned(
                        dir,
                        size_before,
                        Some(format!("{}; removed {} directly", cause, ARTIFACT_DIR)),
                    ),
                    Err(e) => CleanResult::Failed {
                        path: dir.to_path_buf(),
                        error: e.to_string(),
                    },
                })
            }
            FailureKind::Genuine => {
                let mut error = output.diagnostics.trim().to_string();
                if error.is_empty() {
                    error = "clean command failed".to_string();
                }
                if let Some(removal) = removal_error {
                    error = format!("{} (artifact removal also failed: {})", error, removal);
                }
                Ok(CleanResult::Failed {
                    path: dir.to_path_buf(),
                    error,
                })
            }
        }
    }
}

fn cleaned(dir: &Path, size_before: u64, note: Option<String>) -> CleanResult {
    let size_after = dir_size(&artifact_dir(dir));
    CleanResult::Cleaned {
        path: dir.to_path_buf(),
        freed_bytes: size_before.saturating_sub(size_after),
        note,
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("clean command failed")
        .to_string()
}

/// Remove the artifact directory of `dir`, returning the bytes freed.
///
/// A missing artifact directory frees nothing and is not an error.
pub fn remove_artifacts(dir: &Path) -> io::Result<u64> {
    let target = artifact_dir(dir);
    if !target.exists() {
        return Ok(0);
    }
    let size = dir_size(&target);
    fs::remove_dir_all(&target)?;
    tracing::debug!(path = %target.display(), size, "Removed artifact directory");
    Ok(size)
}

pub(crate) fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
