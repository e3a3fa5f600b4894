//! Entry point: parses the command line, installs logging, and hands off to
//! the run coordinator.

use std::process::ExitCode;

use clap::Parser;

use ngs_align::config::{Cli, RunConfig};
use ngs_align::pipeline::RunCoordinator;
use ngs_align::log;

fn main() -> ExitCode {
    let log_buffer = log::init();

    let cli = Cli::parse();
    let config = RunConfig::from(cli);

    match RunCoordinator::new(config).run(log_buffer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
