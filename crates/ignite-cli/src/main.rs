use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};
use ignite_observe::{LoggerConfig, init_local_offset, init_logger};
use tracing::debug;

mod cli;
mod config;
mod duration;
mod start;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    // Before any thread exists; see `init_local_offset`.
    init_local_offset();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let logger = LoggerConfig::default()
        .with_level(cli.log_level.clone())
        .with_format(cli.log_format);
    init_logger(&logger)?;
    debug!(?logger, "logger initialized");

    match &cli.command {
        Commands::Start(args) => {
            let sub = matches
                .subcommand_matches("start")
                .ok_or_else(|| anyhow::anyhow!("missing `start` arguments"))?;
            start::run(args, &args.cli_flags(sub))
        }
    }
}
