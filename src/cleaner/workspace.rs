//! Cleaning of workspace roots.

use crate::cleaner::executor::{dir_size, remove_artifacts, CleanExecutor, CleanResult};
use crate::cleaner::manifest::{self, artifact_dir, Classification};
use crate::cleaner::tool::CleanMode;
use crate::error::Result;
use crate::report;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct MemberTally {
    cleaned: usize,
    failed: usize,
    freed_bytes: u64,
}

/// Fate of a directory handed to direct artifact removal.
enum Removal {
    Removed(u64),
    NothingToRemove,
    Failed,
}

/// Cleans a workspace as one unit, falling back to its members.
pub struct WorkspaceCoordinator<'a> {
    executor: &'a CleanExecutor,
}

impl<'a> WorkspaceCoordinator<'a> {
    pub fn new(executor: &'a CleanExecutor) -> Self {
        Self { executor }
    }

    /// Clean the workspace rooted at `root`.
    ///
    /// Missing members are reported once each and never fail the workspace
    /// on their own. A directory that is not a workspace is handed to the
    /// executor unchanged.
    pub fn clean_workspace(&self, root: &Path) -> Result<CleanResult> {
        let manifest = match manifest::classify(root) {
            Ok(Classification::Manifest(m)) if m.has_workspace_section => m,
            Ok(_) => return self.executor.clean(root),
            Err(e) => {
                return Ok(CleanResult::Failed {
                    path: root.to_path_buf(),
                    error: e.to_string(),
                })
            }
        };

        let size_before = dir_size(&artifact_dir(root));
        let validation = manifest.validate_members();

        for missing in &validation.missing {
            report::warning(format!(
                "Missing workspace member '{}' in {}",
                missing,
                root.display()
            ));
        }

        if !validation.is_complete() {
            return self.clean_members(root, &validation.present, size_before);
        }

        let output = self.executor.tool().run(root, CleanMode::Workspace)?;
        if output.success {
            let freed_bytes = size_before.saturating_sub(dir_size(&artifact_dir(root)));
            return Ok(CleanResult::Cleaned {
                path: root.to_path_buf(),
                freed_bytes,
                note: None,
            });
        }

        tracing::debug!(root = %root.display(), diagnostics = %output.diagnostics, "Workspace clean failed");
        report::warning(format!(
            "Workspace clean failed in {}, cleaning members individually",
            root.display()
        ));
        self.clean_members(root, &validation.present, size_before)
    }

    fn clean_members(
        &self,
        root: &Path,
        members: &[PathBuf],
        root_size_before: u64,
    ) -> Result<CleanResult> {
        let mut tally = MemberTally::default();

        for member in members.iter().filter(|m| m.as_path() != root) {
            match self.executor.clean(member)? {
                CleanResult::Cleaned { freed_bytes, .. } => {
                    tracing::info!(member = %member.display(), freed_bytes, "Member cleaned");
                    tally.cleaned += 1;
                    tally.freed_bytes += freed_bytes;
                }
                CleanResult::SkippedInvalid { .. } | CleanResult::SkippedAlreadyHandled { .. } => {}
                CleanResult::Failed { error, .. } => {
                    tracing::debug!(member = %member.display(), %error, "Member clean failed");
                    match remove_directly(member) {
                        Removal::Removed(bytes) => {
                            tally.cleaned += 1;
                            tally.freed_bytes += bytes;
                        }
                        Removal::NothingToRemove => {}
                        Removal::Failed => tally.failed += 1,
                    }
                }
            }
        }

        // The shared artifact directory lives at the root.
        let (shared_removed, shared_failed) = match remove_directly(root) {
            Removal::Removed(bytes) => {
                tally.freed_bytes += bytes;
                (true, false)
            }
            Removal::NothingToRemove => {
                tally.freed_bytes += root_size_before;
                (false, false)
            }
            Removal::Failed => (false, true),
        };

        let total = members.len();
        let path = root.to_path_buf();
        Ok(if tally.cleaned > 0 {
            let note = if tally.failed > 0 {
                format!("partially cleaned, {} failed", tally.failed)
            } else {
                format!("cleaned {} of {} members individually", tally.cleaned, total)
            };
            CleanResult::Cleaned {
                path,
                freed_bytes: tally.freed_bytes,
                note: Some(note),
            }
        } else if tally.failed == 0 && !shared_failed {
            let note = if shared_removed {
                "removed shared target directory"
            } else {
                "nothing to clean"
            };
            CleanResult::Cleaned {
                path,
                freed_bytes: tally.freed_bytes,
                note: Some(note.to_string()),
            }
        } else if tally.failed > 0 {
            CleanResult::Failed {
                path,
                error: format!("{} member(s) could not be cleaned", tally.failed),
            }
        } else {
            CleanResult::Failed {
                path,
                error: format!("could not remove {}", artifact_dir(root).display()),
            }
        })
    }
}

fn remove_directly(dir: &Path) -> Removal {
    if !artifact_dir(dir).exists() {
        return Removal::NothingToRemove;
    }
    match remove_artifacts(dir) {
        Ok(bytes) => Removal::Removed(bytes),
        Err(e) => {
            report::error(format!(
                "Could not remove {}: {}",
                artifact_dir(dir).display(),
                e
            ));
            Removal::Failed
        }
    }
}
