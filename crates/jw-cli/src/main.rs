use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use jw_cli::commands::post::{self, PostArgs};
use jw_cli::{Cli, Config, candidate_paths, logging};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every worklog was posted.
fn run(cli: &Cli) -> Result<bool> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    logging::init(&config.log_level);

    match &config.source {
        Some(path) => tracing::info!("Using config file: {}", path.display()),
        None => {
            let searched: Vec<String> = candidate_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            tracing::warn!(
                "No config file found, using environment variables only (searched: {})",
                searched.join(", ")
            );
        }
    }
    tracing::info!(
        "Starting jira-worklogger with log level: {}",
        config.log_level
    );
    tracing::debug!(?config, "loaded configuration");

    let args = PostArgs {
        date: cli.date.as_deref(),
        entries: cli.provided_entries(),
    };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let report = post::run(&mut stdin.lock(), &mut stdout.lock(), args, &config)?;
    Ok(report.is_success())
}
