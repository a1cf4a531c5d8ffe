use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Cargo Sweeper - Clean build artifacts of every Cargo project in a tree
#[derive(Parser, Debug)]
#[command(name = "cargo-sweeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Program used to run `clean`
    #[arg(long, env = "CARGO_SWEEPER_CARGO", value_name = "PROGRAM")]
    pub cargo: Option<String>,

    /// Directory names to skip (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Don't retry failed cleans with --offline and --release
    #[arg(long)]
    pub no_retry: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Validates the CLI definition is correct
        Cli::command().debug_assert();
    }

    #[test]
    fn path_defaults_to_current_dir() {
        let cli = Cli::parse_from(["cargo-sweeper"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.exclude.is_empty());
        assert!(!cli.no_retry);
    }

    #[test]
    fn parse_with_options() {
        let cli = Cli::parse_from([
            "cargo-sweeper",
            "--cargo",
            "/opt/cargo",
            "-e",
            "vendor",
            "--exclude",
            "third_party",
            "--no-retry",
            "/projects",
        ]);
        assert_eq!(cli.path, PathBuf::from("/projects"));
        assert_eq!(cli.cargo.as_deref(), Some("/opt/cargo"));
        assert_eq!(cli.exclude, vec!["vendor", "third_party"]);
        assert!(cli.no_retry);
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::parse_from(["cargo-sweeper", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }
}
