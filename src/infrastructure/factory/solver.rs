//! Solver factory.
//!
//! Provides factory functions for constructing the solver backend and the
//! allocation service from configuration.

use std::sync::Arc;

use tracing::debug;

use crate::application::allocator::Allocator;
use crate::application::solver::NativeSolver;
use crate::error::Result;
use crate::infrastructure::config::solver::{SolverBackend, SolverConfig};
use crate::port::solver::Solver;

/// Build the configured solver backend.
///
/// # Errors
///
/// Returns [`SolverError::Unavailable`](crate::error::SolverError::Unavailable)
/// when the backend was not compiled in.
pub fn build_solver(config: &SolverConfig) -> Result<Arc<dyn Solver>> {
    let options = config.options();
    debug!(backend = %config.backend, ?options, "building solver");

    match config.backend {
        SolverBackend::Native => Ok(Arc::new(NativeSolver::new(options))),
        #[cfg(feature = "highs")]
        SolverBackend::Highs => Ok(Arc::new(
            crate::adapter::outbound::solver::HiGHSSolver::new(options),
        )),
        #[cfg(not(feature = "highs"))]
        SolverBackend::Highs => Err(crate::error::SolverError::Unavailable {
            backend: "highs",
            reason: "built without the 'highs' feature".to_string(),
        }
        .into()),
    }
}

/// Build an allocator backed by the configured solver.
///
/// # Errors
///
/// See [`build_solver`].
pub fn build_allocator(config: &SolverConfig) -> Result<Allocator> {
    build_solver(config).map(Allocator::new)
}
