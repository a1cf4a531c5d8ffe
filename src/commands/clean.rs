//! Clean command implementation.

use crate::cleaner::{
    CargoTool, CleanExecutor, CleanOptions, CleanOrchestrator, ProjectScanner, RunSummary,
    ScanOptions,
};
use crate::cli::Cli;
use crate::config::{CleanerConfig, Config};
use crate::error::SweeperError;
use crate::report;
use anyhow::Result;
use humansize::{format_size, BINARY};

/// Command-line flags take precedence over the configuration file.
fn effective_config(cli: &Cli, config: Config) -> Result<CleanerConfig> {
    let mut merged = config;
    if let Some(cargo) = &cli.cargo {
        merged.cleaner.cargo = cargo.clone();
    }
    merged.cleaner.exclude.extend(cli.exclude.iter().cloned());
    if cli.no_retry {
        merged.cleaner.offline_retry = false;
        merged.cleaner.release_retry = false;
    }
    merged.validate()?;
    Ok(merged.cleaner)
}

/// Run the clean command.
pub fn run(cli: &Cli, config: Config) -> Result<RunSummary> {
    let cleaner = effective_config(cli, config)?;

    if !cli.path.is_dir() {
        return Err(SweeperError::PathNotFound(cli.path.clone()).into());
    }
    let path = cli
        .path
        .canonicalize()
        .map_err(|e| SweeperError::io(&cli.path, e))?;

    tracing::debug!(?cleaner, "Effective cleaner configuration");
    report::info(format!("Scanning for Cargo projects in {}", path.display()));

    let executor = CleanExecutor::new(
        Box::new(CargoTool::new(cleaner.cargo)),
        CleanOptions {
            offline_retry: cleaner.offline_retry,
            release_retry: cleaner.release_retry,
        },
    );
    let scanner = ProjectScanner::new(ScanOptions {
        exclude_patterns: cleaner.exclude,
        follow_symlinks: cleaner.follow_symlinks,
    });

    let summary = CleanOrchestrator::new(scanner, executor).run(&path)?;
    print_summary(&summary);
    Ok(summary)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Cleaned: {} project{}",
        summary.cleaned_count,
        plural(summary.cleaned_count)
    );
    if summary.skipped_count > 0 {
        println!(
            "  Skipped: {} project{}",
            summary.skipped_count,
            plural(summary.skipped_count)
        );
    }
    println!(
        "  Failed:  {} project{}",
        summary.failed_count,
        plural(summary.failed_count)
    );
    println!("  Freed:   {}", format_size(summary.total_freed, BINARY));

    if summary.failed_count > 0 {
        report::error(format!(
            "{} project{} could not be cleaned",
            summary.failed_count,
            plural(summary.failed_count)
        ));
    } else {
        report::success("All projects cleaned");
    }
}
