use std::process::ExitCode;

use budget_allocator::adapter::inbound::cli::{self, command::Cli, output};
use clap::Parser;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli::run(&cli) {
        Ok(code) => code,
        Err(report) => {
            if output::is_json() {
                output::error(&report.to_string());
            } else {
                eprintln!("{report:?}");
            }
            ExitCode::FAILURE
        }
    }
}
