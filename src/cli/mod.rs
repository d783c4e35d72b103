//! Command line interface for the Maven bundle assembler.
//!
//! This module provides argument parsing, command dispatch, and user
//! feedback.

mod args;
pub mod commands;
mod output;

pub use args::{Args, BundleArgs, Command, InspectArgs, RuntimeConfig};
pub use output::OutputManager;

use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Runs already-parsed arguments and returns the process exit code.
///
/// Errors are printed with recovery suggestions before being returned.
pub async fn execute(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);
    let output = config.output();

    let result = match args.validate() {
        Err(reason) => Err(CliError::InvalidArguments { reason }.into()),
        Ok(()) => match &args.command {
            Command::Bundle(bundle) => commands::bundle::execute(bundle, output).await,
            Command::Inspect(inspect) => commands::inspect::execute(inspect, output),
        },
    };

    if let Err(e) = &result {
        output.error(&e.to_string())?;
        for suggestion in e.recovery_suggestions() {
            output.indent(&suggestion)?;
        }
    }
    result
}
