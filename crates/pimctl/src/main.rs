//! pimctl: calendar and contacts from the command line
//!
//! Usage:
//!   pimctl calendar <action> [args...]
//!   pimctl contacts <action> [args...]
//!   pimctl --help
//!
//! Results are JSON on stdout; errors are `{"error": ...}` on stderr with
//! exit code 1.

mod cli;
mod dispatch;
mod error;
mod logging;

use std::process::ExitCode;

use pim_core::Config;

use crate::cli::Command;
use crate::dispatch::{Outcome, SystemBackends};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match cli::parse(&args) {
        Ok(Command::Help) => {
            println!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("{}", dispatch::version());
            return ExitCode::SUCCESS;
        }
        Ok(command) => command,
        Err(e) => return finish(Outcome::failure(&e)),
    };

    // Load .env file
    dotenvy::dotenv().ok();

    let config = match Config::load().and_then(|config| logging::init(&config).map(|()| config)) {
        Ok(config) => config,
        Err(e) => return finish(Outcome::failure(&CliError::from(e))),
    };
    tracing::debug!("Running {:?}", command);

    let backends = SystemBackends::new(config);
    finish(dispatch::execute(command, &backends).await)
}

fn finish(outcome: Outcome) -> ExitCode {
    outcome.emit();
    ExitCode::from(outcome.exit_code)
}
