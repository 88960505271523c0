//! Depth-first branch-and-bound over binary variables.
//!
//! Every node is a copy of the variable bounds with some binaries fixed to 0
//! or 1. The LP relaxation of a node bounds every integral solution below it,
//! so a node whose bound cannot beat the incumbent is discarded unsolved.

use std::time::Instant;

use tracing::{debug, trace};

use super::simplex::solve_relaxation;
use crate::domain::constraint::VariableBounds;
use crate::domain::model::{is_integral, Model, ObjectiveSense};
use crate::port::solver::{Solution, SolutionStatus, SolverOptions};

/// Node in the branch-and-bound tree.
struct Node {
    bounds: Vec<VariableBounds>,
    /// Relaxation objective of the parent, oriented so larger is better.
    bound: f64,
    depth: usize,
}

/// Best integral solution found so far.
struct Incumbent {
    values: Vec<f64>,
    objective: f64,
    /// `objective` oriented so larger is better.
    score: f64,
}

/// Objective value oriented so that larger is always better.
fn oriented(model: &Model, objective: f64) -> f64 {
    match model.sense {
        ObjectiveSense::Maximize => objective,
        ObjectiveSense::Minimize => -objective,
    }
}

/// Binary variable whose relaxed value is closest to 0.5, if any is fractional.
fn branching_variable(model: &Model, values: &[f64]) -> Option<usize> {
    model
        .binary_vars
        .iter()
        .copied()
        .filter(|&j| !is_integral(values[j], model.integrality_tolerance()))
        .min_by(|&a, &b| {
            let da = (values[a] - 0.5).abs();
            let db = (values[b] - 0.5).abs();
            da.total_cmp(&db).then(a.cmp(&b))
        })
}

/// Solve a mixed-integer model by branch-and-bound.
///
/// Returns `ResourceExhausted` when the node budget, the deadline or a
/// per-node iteration limit stops the search before the tree is exhausted;
/// the best incumbent, if any, is carried in the solution.
#[must_use]
pub fn branch_and_bound(model: &Model, options: &SolverOptions) -> Solution {
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);
    let tol = model.tolerance;

    let mut stack = vec![Node {
        bounds: model.bounds.clone(),
        bound: f64::INFINITY,
        depth: 0,
    }];
    let mut incumbent: Option<Incumbent> = None;
    let mut nodes = 0;
    let mut iterations = 0;
    let mut complete = true;

    while let Some(node) = stack.pop() {
        if nodes >= options.max_nodes || deadline.is_some_and(|d| Instant::now() >= d) {
            complete = false;
            break;
        }

        if let Some(best) = &incumbent {
            if node.bound <= best.score + tol {
                continue;
            }
        }

        nodes += 1;
        let relaxation = solve_relaxation(model, &node.bounds, options.max_iterations);
        iterations += relaxation.iterations;

        let (values, objective) = match (relaxation.status, relaxation.values, relaxation.objective) {
            (SolutionStatus::Optimal, Some(values), Some(objective)) => (values, objective),
            (SolutionStatus::Unbounded, _, _) => {
                debug!(nodes, depth = node.depth, "relaxation unbounded");
                return Solution::without_values(SolutionStatus::Unbounded)
                    .with_stats(iterations, nodes);
            }
            (SolutionStatus::ResourceExhausted, _, _) => {
                // The subtree stays unexplored, so optimality cannot be proven.
                complete = false;
                continue;
            }
            _ => continue,
        };

        let score = oriented(model, objective);
        if let Some(best) = &incumbent {
            if score <= best.score + tol {
                continue;
            }
        }

        match branching_variable(model, &values) {
            None => {
                let mut values = values;
                for &j in &model.binary_vars {
                    values[j] = values[j].round();
                }
                let objective = model.objective_value(&values);
                trace!(nodes, depth = node.depth, objective, "new incumbent");
                incumbent = Some(Incumbent {
                    score: oriented(model, objective),
                    values,
                    objective,
                });
            }
            Some(var) => {
                trace!(
                    nodes,
                    depth = node.depth,
                    var,
                    value = values[var],
                    "branching"
                );
                for fixed in [0.0, 1.0] {
                    let mut bounds = node.bounds.clone();
                    bounds[var] = VariableBounds::fixed(fixed);
                    stack.push(Node {
                        bounds,
                        bound: score,
                        depth: node.depth + 1,
                    });
                }
            }
        }
    }

    debug!(
        nodes,
        iterations,
        complete,
        found = incumbent.is_some(),
        "branch-and-bound finished"
    );

    let status = match (complete, &incumbent) {
        (false, _) => SolutionStatus::ResourceExhausted,
        (true, Some(_)) => SolutionStatus::Optimal,
        (true, None) => SolutionStatus::Infeasible,
    };

    match incumbent {
        Some(best) => Solution {
            status,
            values: Some(best.values),
            objective: Some(best.objective),
            iterations,
            nodes,
        },
        None => Solution::without_values(status).with_stats(iterations, nodes),
    }
}
