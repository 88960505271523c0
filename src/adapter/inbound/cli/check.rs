//! `check` commands: validate inputs without solving.

use std::path::Path;

use serde_json::json;

use super::command::CheckCommand;
use super::diagnostic::CommandError;
use super::output;
use super::request::{load_config, load_request};
use crate::application::builder::validate;
use crate::infrastructure::config::settings::DEFAULT_CONFIG_PATH;

/// Run a `check` subcommand.
///
/// # Errors
///
/// Returns a diagnostic describing the first problem found.
pub fn execute(command: &CheckCommand) -> miette::Result<()> {
    match command {
        CheckCommand::Request(arg) => execute_request(&arg.request),
        CheckCommand::Config(arg) => execute_config(arg.config.as_deref()),
    }
}

/// Validate a request file against every input invariant.
pub fn execute_request(path: &Path) -> miette::Result<()> {
    let request = load_request(path)?;
    validate(&request.channels, &request.constraints)
        .map_err(|e| CommandError::from(crate::error::Error::from(e)))?;

    let mixed_integer = request.constraints.min_channels_used.is_some();
    if output::is_json() {
        output::json_output(json!({
            "command": "check.request",
            "valid": true,
            "channels": request.channels.len(),
            "totalBudget": request.constraints.total_budget,
            "mixedInteger": mixed_integer,
        }));
        return Ok(());
    }

    output::section("Request Check");
    output::field("Request", path.display());
    output::field("Channels", request.channels.len());
    output::field("Budget", output::amount(request.constraints.total_budget));
    output::field(
        "Model",
        if mixed_integer {
            "mixed-integer (channel usage)"
        } else {
            "linear"
        },
    );
    output::success("Request is valid");
    Ok(())
}

/// Validate a configuration file; without a path, `config.toml` or defaults.
pub fn execute_config(path: Option<&Path>) -> miette::Result<()> {
    let config = load_config(path)?;
    let source = match path {
        Some(path) => path.display().to_string(),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => DEFAULT_CONFIG_PATH.to_string(),
        None => "defaults".to_string(),
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "valid": true,
            "source": source,
            "backend": config.solver.backend.as_str(),
            "maxNodes": config.solver.max_nodes,
            "maxIterations": config.solver.max_iterations,
            "timeLimitMs": config.solver.time_limit_ms,
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", source);
    output::field("Backend", config.solver.backend);
    output::field("Max nodes", config.solver.max_nodes);
    output::field("Max iterations", config.solver.max_iterations);
    output::field(
        "Time limit",
        config
            .solver
            .time_limit_ms
            .map_or_else(|| output::muted("none"), |ms| format!("{ms} ms")),
    );
    output::field("Log level", &config.logging.level);
    output::success("Configuration file is valid");
    Ok(())
}
