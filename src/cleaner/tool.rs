//! Invocation of the external `clean` subcommand.

use crate::error::{Result, SweeperError};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;

/// Flavour of `clean` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    Default,
    Offline,
    Release,
    Workspace,
}

impl CleanMode {
    /// Arguments passed to the tool for this mode.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            CleanMode::Default => &["clean"],
            CleanMode::Offline => &["clean", "--offline"],
            CleanMode::Release => &["clean", "--release"],
            CleanMode::Workspace => &["clean", "--workspace"],
        }
    }
}

impl fmt::Display for CleanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

/// Outcome of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// Combined stdout and stderr. Only filled in on failure.
    pub diagnostics: String,
}

impl ToolOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            diagnostics: String::new(),
        }
    }

    pub fn failed(diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// External package manager able to clean a project directory.
pub trait CleanTool {
    /// Run `clean` in `dir`.
    ///
    /// A tool that runs and fails is reported through [`ToolOutput`]; `Err`
    /// is reserved for a directory that cannot be entered.
    fn run(&self, dir: &Path, mode: CleanMode) -> Result<ToolOutput>;
}

/// Process-backed tool, `cargo` by default.
#[derive(Debug, Clone)]
pub struct CargoTool {
    program: String,
}

impl CargoTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CargoTool {
    fn default() -> Self {
        Self::new("cargo")
    }
}

/// Fail the same way a `chdir` into `dir` would.
fn ensure_enterable(dir: &Path) -> Result<()> {
    let to_err = |source: io::Error| SweeperError::DirectoryChange {
        path: dir.to_path_buf(),
        source,
    };

    let meta = dir.metadata().map_err(to_err)?;
    if !meta.is_dir() {
        return Err(to_err(io::Error::other("not a directory")));
    }
    dir.read_dir().map_err(to_err)?;
    Ok(())
}

impl CleanTool for CargoTool {
    fn run(&self, dir: &Path, mode: CleanMode) -> Result<ToolOutput> {
        ensure_enterable(dir)?;

        tracing::debug!(dir = %dir.display(), program = %self.program, %mode, "Running clean tool");

        let output = match Command::new(&self.program)
            .args(mode.args())
            .current_dir(dir)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                return Ok(ToolOutput::failed(format!(
                    "failed to run `{}`: {}",
                    self.program, e
                )))
            }
        };

        if output.status.success() {
            return Ok(ToolOutput::ok());
        }

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ToolOutput::failed(diagnostics))
    }
}
