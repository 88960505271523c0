//! Allocation service.
//!
//! Runs one request through the pipeline:
//!
//! ```text
//! AllocationRequest -> build_model -> Solver::solve -> interpret -> AllocationResult
//! ```
//!
//! The service holds no mutable state, so one instance can serve concurrent
//! requests from many threads.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::builder::build_model;
use super::interpreter::interpret;
use super::solver::NativeSolver;
use crate::domain::allocation::{AllocationResult, AllocationStatus};
use crate::domain::channel::{AllocationRequest, ChannelSpec, GlobalConstraints};
use crate::error::Result;
use crate::port::solver::Solver;

/// Optimizes budget allocations with a pluggable solver backend.
#[derive(Clone)]
pub struct Allocator {
    solver: Arc<dyn Solver>,
}

impl Allocator {
    /// Create an allocator backed by `solver`.
    #[must_use]
    pub fn new(solver: Arc<dyn Solver>) -> Self {
        Self { solver }
    }

    /// Name of the solver backend in use.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.solver.name()
    }

    /// Optimize one request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::error::Error::Validation) for
    /// malformed input and [`Error::Solver`](crate::error::Error::Solver) when
    /// the backend fails. Infeasible, unbounded and exhausted searches are
    /// reported through [`AllocationResult::status`].
    pub fn allocate(&self, request: &AllocationRequest) -> Result<AllocationResult> {
        self.allocate_parts(&request.channels, &request.constraints)
    }

    /// Optimize channels and constraints supplied separately.
    ///
    /// # Errors
    ///
    /// Same as [`Allocator::allocate`].
    pub fn allocate_parts(
        &self,
        channels: &[ChannelSpec],
        constraints: &GlobalConstraints,
    ) -> Result<AllocationResult> {
        let started = Instant::now();
        let compiled = build_model(channels, constraints)?;

        debug!(
            backend = self.backend(),
            mixed_integer = compiled.model.is_mixed_integer(),
            "solving allocation model"
        );
        let solution = self.solver.solve(&compiled.model)?;
        let result = interpret(&solution, &compiled, channels, constraints, self.backend());

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result.status {
            AllocationStatus::Optimal => info!(
                channels = channels.len(),
                total_spend = result.total_spend,
                total_revenue = result.total_revenue,
                even_split_revenue = result.even_split_revenue,
                channels_used = result.channels_used,
                elapsed_ms,
                "allocation optimal"
            ),
            AllocationStatus::Infeasible => info!(
                channels = channels.len(),
                diagnostic = result.diagnostic.as_deref().unwrap_or_default(),
                elapsed_ms,
                "allocation infeasible"
            ),
            AllocationStatus::ResourceExhausted => warn!(
                nodes = result.stats.nodes_explored,
                incumbent = result.allocation.is_some(),
                elapsed_ms,
                "search budget exhausted before optimality was proven"
            ),
            AllocationStatus::Unbounded => warn!(
                channels = channels.len(),
                "allocation model is unbounded"
            ),
        }

        Ok(result)
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(Arc::new(NativeSolver::default()))
    }
}

impl std::fmt::Debug for Allocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocator")
            .field("backend", &self.backend())
            .finish()
    }
}

/// Optimize an allocation with the native solver and default limits.
///
/// # Errors
///
/// See [`Allocator::allocate`].
///
/// # Examples
///
/// ```
/// use budget_allocator::domain::{AllocationStatus, ChannelSpec, GlobalConstraints};
///
/// let channels = [ChannelSpec::new("search", 2.0), ChannelSpec::new("social", 1.0)];
/// let result = budget_allocator::solve(&channels, &GlobalConstraints::new(100.0)).unwrap();
///
/// assert_eq!(result.status, AllocationStatus::Optimal);
/// assert!((result.total_revenue - 200.0).abs() < 1e-6);
/// ```
pub fn solve(channels: &[ChannelSpec], constraints: &GlobalConstraints) -> Result<AllocationResult> {
    Allocator::default().allocate_parts(channels, constraints)
}
