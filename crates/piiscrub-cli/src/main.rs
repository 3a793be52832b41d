mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{run, Cli};
use crate::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level, cli.log_json) {
        eprintln!("{e:#}");
        return ExitCode::from(3);
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "piiscrub starting");

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(error = %message, "command failed");
            eprintln!("Error: {message}");
            ExitCode::from(2)
        }
    }
}
