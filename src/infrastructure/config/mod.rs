//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;
pub mod solver;

pub use logging::LoggingConfig;
pub use settings::{Config, DEFAULT_CONFIG_PATH};
pub use solver::{SolverBackend, SolverConfig};
