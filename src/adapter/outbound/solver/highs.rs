//! HiGHS solver backend via good_lp.
//!
//! HiGHS is an open-source linear and mixed-integer programming solver. The
//! whole model, binaries included, is handed over in one call, so node and
//! iteration limits of [`SolverOptions`] do not apply to this backend.

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution as _, SolverModel,
    Variable,
};
use tracing::debug;

use crate::application::solver::validate_model;
use crate::domain::constraint::ConstraintSense;
use crate::domain::model::{Model, ObjectiveSense};
use crate::error::{Result, SolverError};
use crate::port::solver::{Solution, SolutionStatus, Solver, SolverOptions};

/// HiGHS-based LP/MILP solver.
#[derive(Debug, Default, Clone)]
pub struct HiGHSSolver {
    options: SolverOptions,
}

impl HiGHSSolver {
    /// Create a new HiGHS solver instance.
    #[must_use]
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

fn linear(vars: &[Variable], coefficients: &[f64]) -> Expression {
    vars.iter().zip(coefficients).map(|(v, &c)| c * *v).sum()
}

impl Solver for HiGHSSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &Model) -> Result<Solution> {
        validate_model(model)?;

        let n = model.num_vars();
        if n == 0 {
            return Ok(Solution::optimal(Vec::new(), 0.0));
        }

        let mut vars = variables!();
        let mut var_list = Vec::with_capacity(n);
        for (j, bounds) in model.bounds.iter().enumerate() {
            let mut v = variable();
            if let Some(lb) = bounds.lower {
                v = v.min(lb);
            }
            if let Some(ub) = bounds.upper {
                v = v.max(ub);
            }
            if model.binary_vars.contains(&j) {
                v = v.integer();
            }
            var_list.push(vars.add(v));
        }

        let objective = linear(&var_list, &model.objective);
        let mut problem = match model.sense {
            ObjectiveSense::Maximize => vars.maximise(objective).using(highs),
            ObjectiveSense::Minimize => vars.minimise(objective).using(highs),
        };

        for row in &model.constraints {
            let lhs = linear(&var_list, &row.coefficients);
            let rhs = row.rhs;
            problem = match row.sense {
                ConstraintSense::GreaterEqual => problem.with(constraint!(lhs >= rhs)),
                ConstraintSense::LessEqual => problem.with(constraint!(lhs <= rhs)),
                ConstraintSense::Equal => problem.with(constraint!(lhs == rhs)),
            };
        }

        debug!(
            variables = n,
            rows = model.constraints.len(),
            time_limit = ?self.options.time_limit,
            "handing model to HiGHS"
        );

        match problem.solve() {
            Ok(solution) => {
                let mut values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();
                for &j in &model.binary_vars {
                    values[j] = values[j].round();
                }
                // Re-evaluate the objective with the solved values
                let objective = model.objective_value(&values);
                Ok(Solution::optimal(values, objective))
            }
            Err(ResolutionError::Infeasible) => {
                Ok(Solution::without_values(SolutionStatus::Infeasible))
            }
            Err(ResolutionError::Unbounded) => {
                Ok(Solution::without_values(SolutionStatus::Unbounded))
            }
            Err(e) => Err(SolverError::Backend {
                backend: "highs",
                reason: e.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::{Constraint, VariableBounds};

    #[test]
    fn test_solver_name() {
        assert_eq!(HiGHSSolver::default().name(), "highs");
    }

    #[test]
    fn test_simple_lp() {
        // max 2x + y  s.t. x + y <= 10, x <= 4
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_variable("x", 2.0, VariableBounds::bounded(0.0, 4.0));
        model.add_variable("y", 1.0, VariableBounds::non_negative());
        model.add_constraint(Constraint::leq(vec![1.0, 1.0], 10.0));

        let solution = HiGHSSolver::default().solve(&model).expect("solve");

        assert!(solution.is_optimal());
        assert!((solution.objective.expect("objective") - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_binary_milp() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_binary("a", 5.0);
        model.add_binary("b", 4.0);
        model.add_binary("c", 3.0);
        model.add_constraint(Constraint::leq(vec![2.0, 3.0, 1.0], 5.0));

        let solution = HiGHSSolver::default().solve(&model).expect("solve");

        assert!(solution.is_optimal());
        assert_eq!(solution.values, Some(vec![1.0, 1.0, 0.0]));
    }

    #[test]
    fn test_infeasible() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        model.add_variable("x", 1.0, VariableBounds::bounded(0.0, 1.0));
        model.add_constraint(Constraint::geq(vec![1.0], 2.0));

        let solution = HiGHSSolver::default().solve(&model).expect("solve");

        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_empty_model() {
        let model = Model::new(ObjectiveSense::Maximize, 1e-6);
        let solution = HiGHSSolver::default().solve(&model).expect("solve");
        assert!(solution.is_optimal());
        assert_eq!(solution.values, Some(Vec::new()));
    }
}
