//! Command-line interface definitions.
//!
//! Defines the CLI structure for the budget allocator using `clap`: an
//! `allocate` command that solves a request file and `check` commands that
//! validate inputs without solving.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infrastructure::config::solver::SolverBackend;

/// Optimal advertising budget allocation across channels
#[derive(Parser, Debug)]
#[command(name = "budget-allocator")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Color override to apply, `None` for terminal detection.
    #[must_use]
    pub const fn enabled(&self) -> Option<bool> {
        match self {
            Self::Auto => None,
            Self::Always => Some(true),
            Self::Never => Some(false),
        }
    }
}

/// Solver backend selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendChoice {
    /// Built-in simplex and branch-and-bound
    Native,
    /// HiGHS (requires the `highs` feature)
    Highs,
}

impl From<BackendChoice> for SolverBackend {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Native => Self::Native,
            BackendChoice::Highs => Self::Highs,
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the revenue-maximizing allocation for a request file
    Allocate(AllocateArgs),

    /// Validate inputs without solving
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `budget-allocator check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate a request file (channels and constraints).
    Request(RequestArg),
    /// Validate the configuration file.
    Config(ConfigPathArg),
}

/// Shared argument struct for commands that take an optional configuration path.
///
/// When no path is given, `config.toml` in the working directory is used if
/// present and defaults otherwise.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Positional request file argument.
#[derive(Parser, Debug)]
pub struct RequestArg {
    /// Request file (.json or .toml).
    pub request: PathBuf,
}

/// Arguments for the `allocate` subcommand.
///
/// Optional fields override the corresponding configuration file values.
#[derive(Parser, Debug)]
pub struct AllocateArgs {
    /// Request file (.json or .toml).
    pub request: PathBuf,

    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the solver backend.
    #[arg(long, value_enum)]
    pub backend: Option<BackendChoice>,

    /// Override the branch-and-bound node budget.
    #[arg(long)]
    pub max_nodes: Option<usize>,

    /// Override the per-request time limit in milliseconds.
    #[arg(long)]
    pub time_limit_ms: Option<u64>,
}
