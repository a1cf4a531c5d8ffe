//! Line-oriented status output.
//!
//! Info and success lines go to stdout, warnings and errors to stderr.
//! Diagnostics for developers go through `tracing` instead.

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> colored::ColoredString {
        match self {
            Severity::Info => "[INFO]".blue(),
            Severity::Success => "[OK]".green(),
            Severity::Warning => "[WARN]".yellow(),
            Severity::Error => "[ERROR]".red().bold(),
        }
    }
}

/// Suppress info and success lines.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn status(severity: Severity, message: impl AsRef<str>) {
    let line = format!("{} {}", severity.label(), message.as_ref());
    match severity {
        Severity::Info | Severity::Success => {
            if !QUIET.load(Ordering::Relaxed) {
                println!("{}", line);
            }
        }
        Severity::Warning | Severity::Error => eprintln!("{}", line),
    }
}

pub fn info(message: impl AsRef<str>) {
    status(Severity::Info, message);
}

pub fn success(message: impl AsRef<str>) {
    status(Severity::Success, message);
}

pub fn warning(message: impl AsRef<str>) {
    status(Severity::Warning, message);
}

pub fn error(message: impl AsRef<str>) {
    status(Severity::Error, message);
}
