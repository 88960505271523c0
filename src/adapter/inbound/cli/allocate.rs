//! `allocate` command: solve a request file and render the result.

use std::process::ExitCode;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use super::command::AllocateArgs;
use super::diagnostic::CommandError;
use super::output;
use super::request::{load_config, load_request};
use crate::domain::allocation::{AllocationResult, AllocationStatus};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::build_allocator;

/// Exit code when the request was solved but no optimal allocation exists.
pub const EXIT_NOT_OPTIMAL: u8 = 2;

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "ROI")]
    roi: String,
    #[tabled(rename = "Spend")]
    spend: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Even Spend")]
    even_spend: String,
    #[tabled(rename = "Even Revenue")]
    even_revenue: String,
    #[tabled(rename = "Used")]
    used: &'static str,
}

/// Apply command-line overrides on top of file configuration.
fn apply_overrides(config: &mut Config, args: &AllocateArgs) {
    if let Some(backend) = args.backend {
        config.solver.backend = backend.into();
    }
    if let Some(max_nodes) = args.max_nodes {
        config.solver.max_nodes = max_nodes;
    }
    if let Some(ms) = args.time_limit_ms {
        config.solver.time_limit_ms = Some(ms);
    }
}

/// Load configuration, apply overrides and initialize logging.
fn prepare(args: &AllocateArgs) -> miette::Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate().map_err(CommandError::from)?;

    config
        .logging
        .clone()
        .with_verbosity(output::verbosity(), output::is_quiet())
        .init();
    Ok(config)
}

/// Run the `allocate` command.
///
/// # Errors
///
/// Returns a diagnostic for unreadable or invalid input and solver failures.
pub fn execute(args: &AllocateArgs) -> miette::Result<ExitCode> {
    let config = prepare(args)?;
    let request = load_request(&args.request)?;
    let allocator = build_allocator(&config.solver).map_err(CommandError::from)?;

    let result = allocator.allocate(&request).map_err(CommandError::from)?;

    if output::is_json() {
        let value = serde_json::to_value(&result)
            .map_err(|e| CommandError::new(format!("failed to encode result: {e}")))?;
        output::json_output(value);
    } else {
        render(&result);
    }

    Ok(ExitCode::from(exit_code(result.status)))
}

/// Map a result status to the process exit code.
#[must_use]
pub const fn exit_code(status: AllocationStatus) -> u8 {
    match status {
        AllocationStatus::Optimal => 0,
        _ => EXIT_NOT_OPTIMAL,
    }
}

fn render(result: &AllocationResult) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Allocation");
    output::field("Status", status_label(result.status));
    output::field("Backend", &result.stats.backend);

    if result.allocation.is_some() {
        let rows: Vec<BreakdownRow> = result
            .breakdown
            .iter()
            .map(|line| BreakdownRow {
                channel: line.id.clone(),
                roi: format!("{}", line.roi),
                spend: output::amount(line.spend),
                revenue: output::amount(line.revenue),
                even_spend: output::amount(line.even_split_spend),
                even_revenue: output::amount(line.even_split_revenue),
                used: if line.used { "yes" } else { "no" },
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .modify(Columns::new(1..), Alignment::right());
        output::lines(&table.to_string());

        output::section("Totals");
        output::field("Spend", output::amount(result.total_spend));
        output::field("Revenue", output::amount(result.total_revenue));
        output::field("Even split", output::amount(result.even_split_revenue));
        let lift = result.lift();
        let lift = if lift >= 0.0 {
            output::positive(format!("+{}", output::amount(lift)))
        } else {
            output::negative(output::amount(lift))
        };
        output::field("Lift", lift);
        output::field("Channels used", result.channels_used);
    } else {
        output::field("Even split", output::amount(result.even_split_revenue));
    }

    if output::verbosity() > 0 {
        output::field("LP iterations", result.stats.lp_iterations);
        output::field("B&B nodes", result.stats.nodes_explored);
    }

    match result.status {
        AllocationStatus::Optimal => {}
        AllocationStatus::Infeasible => {
            output::warning("no allocation satisfies every constraint");
            if let Some(diagnostic) = &result.diagnostic {
                output::hint(diagnostic);
            }
        }
        AllocationStatus::ResourceExhausted => {
            output::warning("search stopped before optimality was proven");
            output::hint("raise --max-nodes or --time-limit-ms");
        }
        AllocationStatus::Unbounded => output::warning("the allocation model is unbounded"),
    }
}

fn status_label(status: AllocationStatus) -> String {
    match status {
        AllocationStatus::Optimal => output::positive(status),
        _ => output::negative(status),
    }
}
