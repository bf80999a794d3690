//! # bobsim-cli
//!
//! The `bobsim` binary: parses command-line arguments and dispatches to the
//! `run`/`validate`/`list-behaviors` subcommands.

#![forbid(unsafe_code)]

use crate::args::{Cli, Command};
use anyhow::Result;
use clap::Parser;

mod args;
mod commands;
mod logging;
mod wiring;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // `run` defers logging init until its results directory is known,
        // so `simulation.log` (§6) lands inside it rather than wherever
        // `--log-file` happened to point.
        Command::Run(opts) => commands::run::exec(opts, cli.log, cli.log_file),
        Command::Validate { scenario } => {
            logging::init(cli.log, cli.log_file.as_deref());
            commands::validate::exec(scenario)
        }
        Command::ListBehaviors => {
            logging::init(cli.log, cli.log_file.as_deref());
            commands::list_behaviors::exec()
        }
    }
}
