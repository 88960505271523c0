//! Native LP/MILP solver.
//!
//! Implements the [`Solver`] port with a dense two-phase simplex for pure LPs
//! and depth-first branch-and-bound for models with binary variables.

pub mod branch_bound;
pub mod simplex;

use tracing::debug;

use crate::domain::model::Model;
use crate::error::{Result, SolverError};
use crate::port::solver::{Solution, Solver, SolverOptions};

pub use branch_bound::branch_and_bound;
pub use simplex::solve_relaxation;

/// Simplex and branch-and-bound solver with no external dependencies.
#[derive(Debug, Default, Clone)]
pub struct NativeSolver {
    options: SolverOptions,
}

impl NativeSolver {
    /// Create a solver with the given search limits.
    #[must_use]
    pub const fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Return the configured search limits.
    #[must_use]
    pub const fn options(&self) -> &SolverOptions {
        &self.options
    }
}

impl Solver for NativeSolver {
    fn name(&self) -> &'static str {
        "native"
    }

    fn solve(&self, model: &Model) -> Result<Solution> {
        validate_model(model)?;

        let solution = if model.is_mixed_integer() {
            branch_and_bound(model, &self.options)
        } else {
            solve_relaxation(model, &model.bounds, self.options.max_iterations)
        };

        if let Some(values) = &solution.values {
            if let Some(j) = values.iter().position(|v| !v.is_finite()) {
                return Err(SolverError::Numerical(format!(
                    "variable '{}' has value {}",
                    model.names[j], values[j]
                ))
                .into());
            }
        }

        debug!(
            solver = self.name(),
            status = ?solution.status,
            objective = ?solution.objective,
            iterations = solution.iterations,
            nodes = solution.nodes,
            "model solved"
        );
        Ok(solution)
    }
}

/// Check model dimensions and finiteness before solving.
///
/// # Errors
///
/// Returns [`SolverError`] describing the first malformed part found.
pub fn validate_model(model: &Model) -> std::result::Result<(), SolverError> {
    let n = model.num_vars();

    for (field, len) in [("bounds", model.bounds.len()), ("names", model.names.len())] {
        if len != n {
            return Err(SolverError::DimensionMismatch {
                field,
                variables: n,
                len,
            });
        }
    }

    if let Some(&j) = model.binary_vars.iter().find(|&&j| j >= n) {
        return Err(SolverError::DimensionMismatch {
            field: "binary_vars",
            variables: n,
            len: j + 1,
        });
    }

    if model.objective.iter().any(|c| !c.is_finite()) {
        return Err(SolverError::NonFinite {
            context: "objective".into(),
        });
    }

    for (j, b) in model.bounds.iter().enumerate() {
        let finite = b.lower.map_or(true, |l| l.is_finite()) && b.upper.map_or(true, |u| u.is_finite());
        if !finite {
            return Err(SolverError::NonFinite {
                context: format!("bounds of '{}'", model.names[j]),
            });
        }
    }

    for row in &model.constraints {
        if row.coefficients.len() != n {
            return Err(SolverError::RowLength {
                row: row.label.clone(),
                len: row.coefficients.len(),
                variables: n,
            });
        }
        if !row.rhs.is_finite() || row.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SolverError::NonFinite {
                context: format!("row '{}'", row.label),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::{Constraint, VariableBounds};
    use crate::domain::model::ObjectiveSense;
    use crate::error::Error;
    use crate::port::solver::SolutionStatus;

    #[test]
    fn solver_name() {
        assert_eq!(NativeSolver::default().name(), "native");
    }

    #[test]
    fn routes_pure_lp_to_simplex() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_variable("x", 2.0, VariableBounds::non_negative());
        model.add_constraint(Constraint::leq(vec![1.0], 3.0).labeled("cap"));

        let solution = NativeSolver::default().solve(&model).expect("solve");

        assert!(solution.is_optimal());
        assert_eq!(solution.nodes, 0);
        assert!((solution.objective.expect("objective") - 6.0).abs() < 1e-9);
    }

    #[test]
    fn routes_binaries_to_branch_and_bound() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_binary("a", 1.0);
        model.add_binary("b", 1.0);
        model.add_constraint(Constraint::leq(vec![1.0, 1.0], 1.5));

        let solution = NativeSolver::default().solve(&model).expect("solve");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(solution.nodes >= 1);
        assert!((solution.objective.expect("objective") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_short_rows() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_variable("x", 1.0, VariableBounds::non_negative());
        model.add_variable("y", 1.0, VariableBounds::non_negative());
        model.add_constraint(Constraint::leq(vec![1.0], 3.0).labeled("budget"));

        let err = NativeSolver::default().solve(&model).unwrap_err();

        assert!(matches!(
            err,
            Error::Solver(SolverError::RowLength { len: 1, variables: 2, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_coefficients() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_variable("x", f64::NAN, VariableBounds::non_negative());

        assert!(matches!(
            validate_model(&model),
            Err(SolverError::NonFinite { .. })
        ));
    }
}
