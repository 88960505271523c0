use thiserror::Error;

use crate::domain::error::ValidationError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Solver failures that are not optimization outcomes.
///
/// Infeasible or unbounded models are reported through solution status, not
/// through these errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("model has {variables} variables but {field} has {len} entries")]
    DimensionMismatch {
        field: &'static str,
        variables: usize,
        len: usize,
    },

    #[error("row '{row}' has {len} coefficients, expected {variables}")]
    RowLength {
        row: String,
        len: usize,
        variables: usize,
    },

    #[error("model contains a non-finite coefficient in {context}")]
    NonFinite { context: String },

    #[error("numerical breakdown: {0}")]
    Numerical(String),

    #[error("solver backend '{backend}' is not available: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("solver backend '{backend}' failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
