//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every table is optional and a
//! missing file yields the defaults.
//!
//! # Example
//!
//! ```no_run
//! use budget_allocator::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::solver::SolverConfig;
use crate::error::{ConfigError, Result};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Solver backend and search limits.
    pub solver: SolverConfig,

    /// Logging and tracing configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for files that exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        self.logging.validate()
    }

    /// Initialize the global tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::infrastructure::config::solver::SolverBackend;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse_toml("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.solver.backend, SolverBackend::Native);
        assert_eq!(config.solver.max_nodes, 10_000);
    }

    #[test]
    fn partial_tables_fill_defaults() {
        let config = Config::parse_toml("[solver]\nmax_nodes = 50\n").expect("parse");
        assert_eq!(config.solver.max_nodes, 50);
        assert_eq!(config.solver.max_iterations, 50_000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn invalid_value_names_field() {
        let err = Config::parse_toml("[solver]\nmax_iterations = 0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "solver.max_iterations",
                ..
            })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[solver\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(Config::parse_toml("[wallet]\nkey = 1\n").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("does/not/exist.toml").expect("defaults");
        assert_eq!(config, Config::default());
    }
}
