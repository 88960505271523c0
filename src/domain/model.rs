//! Compiled optimization model.
//!
//! A [`Model`] is the solver-facing form of an allocation request:
//!
//! ```text
//! maximize    c^T * x
//! subject to  constraints
//!             bounds on x
//!             x[j] in {0, 1} for j in binary_vars
//! ```
//!
//! It carries no reference to channels; the builder keeps the mapping from
//! channels to variable indices.

use super::constraint::{Constraint, VariableBounds};

/// Largest distance from 0 or 1 at which a binary still counts as integral.
///
/// `Model::tolerance` is measured in spend units and grows with the budget;
/// binaries are unitless, so their tolerance is capped here.
pub const INTEGRALITY_TOL: f64 = 1e-6;

/// Direction of optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    /// Maximize the objective.
    #[default]
    Maximize,
    /// Minimize the objective.
    Minimize,
}

/// Linear or mixed-integer optimization model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Objective function coefficients.
    pub objective: Vec<f64>,

    /// Whether the objective is maximized or minimized.
    pub sense: ObjectiveSense,

    /// Linear constraint rows.
    pub constraints: Vec<Constraint>,

    /// Lower and upper bounds for each variable.
    pub bounds: Vec<VariableBounds>,

    /// Variable names, used in logs and by external backends.
    pub names: Vec<String>,

    /// Indices of variables restricted to {0, 1}.
    pub binary_vars: Vec<usize>,

    /// Feasibility and integrality tolerance.
    pub tolerance: f64,
}

impl Model {
    /// Create an empty model with no variables.
    #[must_use]
    pub fn new(sense: ObjectiveSense, tolerance: f64) -> Self {
        Self {
            objective: Vec::new(),
            sense,
            constraints: Vec::new(),
            bounds: Vec::new(),
            names: Vec::new(),
            binary_vars: Vec::new(),
            tolerance,
        }
    }

    /// Add a continuous variable and return its index.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        objective: f64,
        bounds: VariableBounds,
    ) -> usize {
        self.objective.push(objective);
        self.bounds.push(bounds);
        self.names.push(name.into());
        self.objective.len() - 1
    }

    /// Add a binary variable and return its index.
    pub fn add_binary(&mut self, name: impl Into<String>, objective: f64) -> usize {
        let index = self.add_variable(name, objective, VariableBounds::binary());
        self.binary_vars.push(index);
        index
    }

    /// Append a constraint row.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Return the number of decision variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Return `true` if the model has binary variables.
    #[must_use]
    pub fn is_mixed_integer(&self) -> bool {
        !self.binary_vars.is_empty()
    }

    /// Evaluate the objective at `values`.
    #[must_use]
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Tolerance used for integrality checks on binary variables.
    #[must_use]
    pub fn integrality_tolerance(&self) -> f64 {
        self.tolerance.min(INTEGRALITY_TOL)
    }

    /// Feasibility tolerance for a single row.
    ///
    /// Rows without binaries are in spend units and use `tolerance`. A row
    /// that touches a binary must not let that binary drift by more than the
    /// integrality tolerance, so its slack is scaled by the largest binary
    /// coefficient instead.
    #[must_use]
    pub fn row_tolerance(&self, row: &Constraint) -> f64 {
        let binary_scale = self
            .binary_vars
            .iter()
            .filter_map(|&j| row.coefficients.get(j))
            .fold(0.0_f64, |acc, a| acc.max(a.abs()));
        if binary_scale == 0.0 {
            self.tolerance
        } else {
            self.tolerance
                .min(self.integrality_tolerance() * binary_scale.max(1.0))
        }
    }

    /// Return `true` if `a` is a strictly better objective value than `b`.
    #[must_use]
    pub fn improves(&self, a: f64, b: f64) -> bool {
        match self.sense {
            ObjectiveSense::Maximize => a > b + self.tolerance,
            ObjectiveSense::Minimize => a < b - self.tolerance,
        }
    }

    /// Return `true` if `values` satisfies every row, bound and integrality
    /// requirement within its tolerance.
    #[must_use]
    pub fn is_feasible(&self, values: &[f64]) -> bool {
        values.len() == self.num_vars()
            && self
                .bounds
                .iter()
                .zip(values)
                .all(|(b, &x)| b.contains(x, self.tolerance))
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(values, self.row_tolerance(c)))
            && self
                .binary_vars
                .iter()
                .all(|&j| is_integral(values[j], self.integrality_tolerance()))
    }
}

/// Return `true` if `value` is within `tolerance` of an integer.
#[must_use]
pub fn is_integral(value: f64, tolerance: f64) -> bool {
    (value - value.round()).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> Model {
        let mut model = Model::new(ObjectiveSense::Maximize, 1e-6);
        let x = model.add_variable("x", 3.0, VariableBounds::non_negative());
        let y = model.add_binary("y", 1.0);
        let mut row = vec![0.0; 2];
        row[x] = 1.0;
        row[y] = 1.0;
        model.add_constraint(Constraint::leq(row, 2.0).labeled("cap"));
        model
    }

    #[test]
    fn variables_are_indexed_in_insertion_order() {
        let model = knapsack();
        assert_eq!(model.num_vars(), 2);
        assert_eq!(model.names, vec!["x", "y"]);
        assert_eq!(model.binary_vars, vec![1]);
        assert!(model.is_mixed_integer());
    }

    #[test]
    fn feasibility_checks_rows_bounds_and_integrality() {
        let model = knapsack();
        assert!(model.is_feasible(&[1.0, 1.0]));
        assert!(!model.is_feasible(&[1.5, 1.0]));
        assert!(!model.is_feasible(&[1.0, 0.5]));
        assert!(!model.is_feasible(&[-1.0, 0.0]));
        assert!(!model.is_feasible(&[1.0]));
    }

    #[test]
    fn improvement_follows_sense() {
        let model = knapsack();
        assert!(model.improves(5.0, 4.0));
        assert!(!model.improves(4.0, 4.0));

        let min = Model::new(ObjectiveSense::Minimize, 1e-6);
        assert!(min.improves(4.0, 5.0));
    }

    #[test]
    fn integrality_tolerance_does_not_grow_with_budget() {
        let mut model = Model::new(ObjectiveSense::Maximize, 1.0);
        model.add_binary("used", 0.0);
        assert_eq!(model.integrality_tolerance(), INTEGRALITY_TOL);
        assert!(!model.is_feasible(&[0.5]));
        assert!(model.is_feasible(&[1.0]));
    }

    #[test]
    fn rows_with_binaries_use_a_tight_tolerance() {
        let mut model = Model::new(ObjectiveSense::Maximize, 2.0);
        let spend = model.add_variable("spend", 1.0, VariableBounds::non_negative());
        let a = model.add_binary("used_a", 0.0);
        let b = model.add_binary("used_b", 0.0);
        model.add_constraint(Constraint::leq(vec![1.0, 0.0, 0.0], 10.0).labeled("budget"));
        model.add_constraint(Constraint::geq(vec![0.0, 1.0, 1.0], 2.0).labeled("count"));
        model.add_constraint(Constraint::leq(vec![1.0, -1e6, 0.0], 0.0).labeled("link"));

        assert_eq!(model.row_tolerance(&model.constraints[0]), 2.0);
        assert_eq!(model.row_tolerance(&model.constraints[1]), INTEGRALITY_TOL);
        assert!((model.row_tolerance(&model.constraints[2]) - 1.0).abs() < 1e-12);

        // One channel short on the count row is not absorbed by a spend-sized slack.
        let mut values = vec![0.0; 3];
        values[spend] = 5.0;
        values[a] = 1.0;
        values[b] = 0.0;
        assert!(!model.is_feasible(&values));
        values[b] = 1.0;
        assert!(model.is_feasible(&values));
    }
}
