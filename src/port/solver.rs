//! Solver port for linear and mixed-integer programming.
//!
//! Defines the trait every optimization backend implements, together with the
//! options and solution types that cross the boundary.
//!
//! # Overview
//!
//! - [`Solver`]: Core LP/MILP solver interface
//! - [`SolverOptions`]: Search limits shared by all backends
//! - [`Solution`]: Solution representation
//! - [`SolutionStatus`]: Termination status

use std::time::Duration;

use crate::domain::model::Model;
use crate::error::Result;

/// Linear and mixed-integer programming solver.
///
/// Implementations wrap a specific backend (the native simplex and
/// branch-and-bound, HiGHS, ...) and provide a unified interface.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) so one solver can serve
/// concurrent allocation requests. Every call works on its own copy of the
/// search state.
pub trait Solver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Solve a model.
    ///
    /// Models without binary variables are solved as LPs; models with binary
    /// variables as MILPs.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is malformed or the backend breaks down.
    /// Infeasible, unbounded and budget-exhausted searches are reported through
    /// [`Solution::status`], not as errors.
    fn solve(&self, model: &Model) -> Result<Solution>;
}

/// Search limits shared by all backends.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Maximum number of branch-and-bound nodes to solve.
    pub max_nodes: usize,
    /// Maximum number of simplex pivots per LP solve.
    pub max_iterations: usize,
    /// Wall-clock deadline for one solve.
    pub time_limit: Option<Duration>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_iterations: 50_000,
            time_limit: None,
        }
    }
}

/// Termination status of an optimization solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Solver found a provably optimal solution.
    Optimal,

    /// No feasible solution exists.
    Infeasible,

    /// Objective function is unbounded.
    Unbounded,

    /// Node, iteration or time budget ran out before optimality was proven.
    ResourceExhausted,
}

/// Solution to a linear or mixed-integer programming problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Termination status.
    pub status: SolutionStatus,

    /// Variable values. Present for `Optimal`, and for `ResourceExhausted`
    /// when a feasible incumbent was found.
    pub values: Option<Vec<f64>>,

    /// Objective value of `values`.
    pub objective: Option<f64>,

    /// Simplex pivots performed.
    pub iterations: usize,

    /// Branch-and-bound nodes solved.
    pub nodes: usize,
}

impl Solution {
    /// Optimal solution with the given values.
    #[must_use]
    pub fn optimal(values: Vec<f64>, objective: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values: Some(values),
            objective: Some(objective),
            iterations: 0,
            nodes: 0,
        }
    }

    /// Solution carrying only a status.
    #[must_use]
    pub const fn without_values(status: SolutionStatus) -> Self {
        Self {
            status,
            values: None,
            objective: None,
            iterations: 0,
            nodes: 0,
        }
    }

    /// Attach search statistics.
    #[must_use]
    pub fn with_stats(mut self, iterations: usize, nodes: usize) -> Self {
        self.iterations = iterations;
        self.nodes = nodes;
        self
    }

    /// Return `true` if the solver found an optimal solution.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
