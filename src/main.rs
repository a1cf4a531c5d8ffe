use clap::{CommandFactory, Parser};
use std::io;
use std::process::ExitCode;

use cargo_sweeper::cleaner::RunSummary;
use cargo_sweeper::cli::Cli;
use cargo_sweeper::commands;
use cargo_sweeper::config::Config;
use cargo_sweeper::report;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "cargo-sweeper", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);
    report::set_quiet(cli.quiet);

    match run(&cli) {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(e) => {
            report::error(format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let config = Config::load(cli.config.as_deref())?;

    tracing::debug!(?config, "Loaded configuration");
    tracing::info!(path = %cli.path.display(), "Starting clean");

    commands::clean::run(cli, config)
}

fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cargo_sweeper={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}
