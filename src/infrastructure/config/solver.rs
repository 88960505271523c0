//! Solver backend configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::port::solver::SolverOptions;

/// Available solver backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    /// Built-in simplex and branch-and-bound.
    #[default]
    Native,
    /// HiGHS through `good_lp`. Requires the `highs` feature.
    Highs,
}

impl SolverBackend {
    /// Whether this backend was compiled into the binary.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Native => true,
            Self::Highs => cfg!(feature = "highs"),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Highs => "highs",
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `[solver]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Backend used for every request.
    pub backend: SolverBackend,

    /// Branch-and-bound node budget.
    pub max_nodes: usize,

    /// Simplex pivot limit per LP solve.
    pub max_iterations: usize,

    /// Wall-clock limit for one request, in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let options = SolverOptions::default();
        Self {
            backend: SolverBackend::default(),
            max_nodes: options.max_nodes,
            max_iterations: options.max_iterations,
            time_limit_ms: None,
        }
    }
}

impl SolverConfig {
    /// Convert into the limits passed to solver backends.
    #[must_use]
    pub fn options(&self) -> SolverOptions {
        SolverOptions {
            max_nodes: self.max_nodes,
            max_iterations: self.max_iterations,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.max_nodes",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.max_iterations",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "solver.time_limit_ms",
                reason: "must be greater than 0 when set".to_string(),
            }
            .into());
        }
        if !self.backend.is_available() {
            return Err(ConfigError::InvalidValue {
                field: "solver.backend",
                reason: format!(
                    "backend '{}' requires building with the '{}' feature",
                    self.backend, self.backend
                ),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_solver_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.options(), SolverOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn time_limit_converts_to_duration() {
        let config = SolverConfig {
            time_limit_ms: Some(1500),
            ..SolverConfig::default()
        };
        assert_eq!(config.options().time_limit, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_zero_limits() {
        for config in [
            SolverConfig {
                max_nodes: 0,
                ..SolverConfig::default()
            },
            SolverConfig {
                max_iterations: 0,
                ..SolverConfig::default()
            },
            SolverConfig {
                time_limit_ms: Some(0),
                ..SolverConfig::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn highs_requires_feature() {
        let config = SolverConfig {
            backend: SolverBackend::Highs,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
