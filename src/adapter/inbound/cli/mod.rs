//! CLI module graph.

pub mod allocate;
pub mod check;
pub mod command;
pub mod diagnostic;
pub mod output;
pub mod request;

use std::process::ExitCode;

use command::{Cli, Commands};
use output::OutputConfig;

/// Apply global flags and dispatch to the selected command.
///
/// # Errors
///
/// Returns the command's diagnostic; the caller renders it and exits with 1.
pub fn run(cli: &Cli) -> miette::Result<ExitCode> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    output::set_color(cli.color.enabled());

    match &cli.command {
        Commands::Allocate(args) => allocate::execute(args),
        Commands::Check(command) => check::execute(command).map(|()| ExitCode::SUCCESS),
    }
}
