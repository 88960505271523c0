//! Two-phase dense-tableau simplex method.
//!
//! Solves the LP relaxation of a [`Model`]:
//!
//! ```text
//! optimize    c^T * x
//! subject to  constraint rows
//!             lower <= x <= upper
//! ```
//!
//! Variables are first mapped onto non-negative tableau columns (finite lower
//! bounds shifted, upper-only bounds mirrored, free variables split) and
//! finite upper bounds become extra rows. Phase 1 minimizes the sum of
//! artificial variables to find a feasible basis and accepts it only if
//! every remaining artificial is within its own row's tolerance; phase 2
//! optimizes the real objective with artificial columns barred from
//! re-entering.
//!
//! Pivot selection uses Dantzig's rule and falls back to Bland's rule after a
//! run of degenerate pivots, so the method terminates on degenerate models.

use tracing::trace;

use crate::domain::constraint::{ConstraintSense, VariableBounds};
use crate::domain::model::{Model, ObjectiveSense};
use crate::port::solver::{Solution, SolutionStatus};

/// Entries smaller than this are treated as zero when choosing pivots.
const PIVOT_TOL: f64 = 1e-9;

/// Reduced costs above `-OPTIMALITY_TOL` do not improve the objective.
const OPTIMALITY_TOL: f64 = 1e-9;

/// Consecutive degenerate pivots before switching to Bland's rule.
const DEGENERATE_LIMIT: usize = 50;

/// How an original variable maps onto tableau columns.
#[derive(Debug, Clone, Copy)]
enum ColumnMap {
    /// `x = offset + col`
    Shifted { col: usize, offset: f64 },
    /// `x = offset - col`
    Mirrored { col: usize, offset: f64 },
    /// `x = pos - neg`
    Split { pos: usize, neg: usize },
}

impl ColumnMap {
    fn value(self, columns: &[f64]) -> f64 {
        match self {
            Self::Shifted { col, offset } => offset + columns[col],
            Self::Mirrored { col, offset } => offset - columns[col],
            Self::Split { pos, neg } => columns[pos] - columns[neg],
        }
    }
}

/// A row over structural columns, before slack and artificial columns exist.
struct StandardRow {
    coefficients: Vec<f64>,
    sense: ConstraintSense,
    rhs: f64,
    /// Largest violation of this row still accepted as feasible.
    tolerance: f64,
}

/// Outcome of optimizing one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Simplex tableau in canonical form.
///
/// `objective[j]` holds the reduced cost of column `j` and
/// `objective[width]` holds the negated objective value.
struct Tableau {
    rows: Vec<Vec<f64>>,
    objective: Vec<f64>,
    basis: Vec<usize>,
    width: usize,
}

impl Tableau {
    fn rhs(&self, row: usize) -> f64 {
        self.rows[row][self.width]
    }

    fn objective_value(&self) -> f64 {
        -self.objective[self.width]
    }

    /// Install a cost vector and price out the current basis.
    fn set_costs(&mut self, costs: &[f64]) {
        self.objective = costs.to_vec();
        self.objective.push(0.0);
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let cost = costs[basic];
            if cost != 0.0 {
                for (o, v) in self.objective.iter_mut().zip(row) {
                    *o -= cost * v;
                }
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.rows[row][col];
        for v in &mut self.rows[row] {
            *v /= pivot;
        }
        let pivot_row = self.rows[row].clone();

        for (i, r) in self.rows.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            eliminate(r, &pivot_row, col);
        }
        eliminate(&mut self.objective, &pivot_row, col);
        self.basis[row] = col;
    }

    /// Column with a negative reduced cost among the first `allowed` columns.
    fn entering(&self, allowed: usize, bland: bool) -> Option<usize> {
        let candidates = self.objective[..allowed]
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d < -OPTIMALITY_TOL);

        if bland {
            candidates.map(|(j, _)| j).next()
        } else {
            candidates
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(j, _)| j)
        }
    }

    /// Minimum ratio test; ties go to the smallest basic column index.
    fn leaving(&self, col: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, row) in self.rows.iter().enumerate() {
            let a = row[col];
            if a <= PIVOT_TOL {
                continue;
            }
            let ratio = row[self.width] / a;
            best = match best {
                None => Some((i, ratio)),
                Some((b, best_ratio)) => {
                    let tie = (ratio - best_ratio).abs() <= PIVOT_TOL * best_ratio.abs().max(1.0);
                    if (ratio < best_ratio && !tie) || (tie && self.basis[i] < self.basis[b]) {
                        Some((i, ratio))
                    } else {
                        Some((b, best_ratio))
                    }
                }
            };
        }
        best.map(|(i, _)| i)
    }

    /// Pivot until no column in `0..allowed` improves the objective.
    fn optimize(&mut self, allowed: usize, max_iterations: usize, iterations: &mut usize) -> PhaseOutcome {
        let mut degenerate_streak = 0;
        loop {
            if *iterations >= max_iterations {
                return PhaseOutcome::IterationLimit;
            }

            let bland = degenerate_streak >= DEGENERATE_LIMIT;
            let Some(col) = self.entering(allowed, bland) else {
                return PhaseOutcome::Optimal;
            };
            let Some(row) = self.leaving(col) else {
                return PhaseOutcome::Unbounded;
            };

            if self.rhs(row).abs() <= PIVOT_TOL {
                degenerate_streak += 1;
            } else {
                degenerate_streak = 0;
            }

            self.pivot(row, col);
            *iterations += 1;
        }
    }

    /// Values of every column at the current basic solution.
    fn column_values(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.width];
        for (i, &basic) in self.basis.iter().enumerate() {
            values[basic] = self.rhs(i);
        }
        values
    }
}

fn eliminate(target: &mut [f64], pivot_row: &[f64], col: usize) {
    let factor = target[col];
    if factor == 0.0 {
        return;
    }
    for (t, p) in target.iter_mut().zip(pivot_row) {
        *t -= factor * p;
    }
    target[col] = 0.0;
}

/// Solve the LP relaxation of `model` under `bounds`.
///
/// Binary variables are treated as continuous within their bounds. `bounds`
/// replaces `model.bounds`, which lets branch-and-bound fix variables without
/// copying the model. The model must already be validated.
#[must_use]
pub fn solve_relaxation(model: &Model, bounds: &[VariableBounds], max_iterations: usize) -> Solution {
    let tol = model.tolerance;

    // Map variables onto non-negative columns.
    let mut maps = Vec::with_capacity(bounds.len());
    let mut n_struct = 0;
    let mut rows: Vec<StandardRow> = Vec::new();
    let mut upper_rows: Vec<(usize, f64)> = Vec::new();

    for b in bounds {
        match (b.lower, b.upper) {
            (Some(lower), upper) => {
                if let Some(upper) = upper {
                    if upper < lower - tol {
                        return Solution::without_values(SolutionStatus::Infeasible);
                    }
                    upper_rows.push((n_struct, (upper - lower).max(0.0)));
                }
                maps.push(ColumnMap::Shifted {
                    col: n_struct,
                    offset: lower,
                });
                n_struct += 1;
            }
            (None, Some(upper)) => {
                maps.push(ColumnMap::Mirrored {
                    col: n_struct,
                    offset: upper,
                });
                n_struct += 1;
            }
            (None, None) => {
                maps.push(ColumnMap::Split {
                    pos: n_struct,
                    neg: n_struct + 1,
                });
                n_struct += 2;
            }
        }
    }

    for constraint in &model.constraints {
        let mut coefficients = vec![0.0; n_struct];
        let mut rhs = constraint.rhs;
        for (&a, map) in constraint.coefficients.iter().zip(&maps) {
            if a == 0.0 {
                continue;
            }
            match *map {
                ColumnMap::Shifted { col, offset } => {
                    coefficients[col] += a;
                    rhs -= a * offset;
                }
                ColumnMap::Mirrored { col, offset } => {
                    coefficients[col] -= a;
                    rhs -= a * offset;
                }
                ColumnMap::Split { pos, neg } => {
                    coefficients[pos] += a;
                    coefficients[neg] -= a;
                }
            }
        }
        rows.push(StandardRow {
            coefficients,
            sense: constraint.sense,
            rhs,
            tolerance: model.row_tolerance(constraint),
        });
    }

    for (col, limit) in upper_rows {
        let mut coefficients = vec![0.0; n_struct];
        coefficients[col] = 1.0;
        rows.push(StandardRow {
            coefficients,
            sense: ConstraintSense::LessEqual,
            rhs: limit,
            tolerance: tol,
        });
    }

    // Empty rows are decided here; the tableau never sees them.
    let mut kept = Vec::with_capacity(rows.len());
    for mut row in rows {
        if row.coefficients.iter().all(|a| a.abs() <= PIVOT_TOL) {
            let satisfied = match row.sense {
                ConstraintSense::LessEqual => 0.0 <= row.rhs + row.tolerance,
                ConstraintSense::GreaterEqual => 0.0 >= row.rhs - row.tolerance,
                ConstraintSense::Equal => row.rhs.abs() <= row.tolerance,
            };
            if !satisfied {
                return Solution::without_values(SolutionStatus::Infeasible);
            }
            continue;
        }
        if row.rhs < 0.0 {
            row.coefficients.iter_mut().for_each(|a| *a = -*a);
            row.rhs = -row.rhs;
            row.sense = row.sense.flipped();
        }
        kept.push(row);
    }
    let rows = kept;

    // Column layout: structural | slack and surplus | artificial.
    let n_slack = rows
        .iter()
        .filter(|r| r.sense != ConstraintSense::Equal)
        .count();
    let n_artificial = rows
        .iter()
        .filter(|r| r.sense != ConstraintSense::LessEqual)
        .count();
    let art_start = n_struct + n_slack;
    let width = art_start + n_artificial;

    let mut tableau = Tableau {
        rows: Vec::with_capacity(rows.len()),
        objective: Vec::new(),
        basis: Vec::with_capacity(rows.len()),
        width,
    };

    let mut art_tolerance = Vec::with_capacity(n_artificial);
    let mut next_slack = n_struct;
    let mut next_art = art_start;
    for row in &rows {
        let mut line = vec![0.0; width + 1];
        line[..n_struct].copy_from_slice(&row.coefficients);
        line[width] = row.rhs;
        match row.sense {
            ConstraintSense::LessEqual => {
                line[next_slack] = 1.0;
                tableau.basis.push(next_slack);
                next_slack += 1;
            }
            ConstraintSense::GreaterEqual => {
                line[next_slack] = -1.0;
                next_slack += 1;
                line[next_art] = 1.0;
                tableau.basis.push(next_art);
                art_tolerance.push(row.tolerance);
                next_art += 1;
            }
            ConstraintSense::Equal => {
                line[next_art] = 1.0;
                tableau.basis.push(next_art);
                art_tolerance.push(row.tolerance);
                next_art += 1;
            }
        }
        tableau.rows.push(line);
    }

    let mut iterations = 0;

    if n_artificial > 0 {
        let mut phase1 = vec![0.0; width];
        phase1[art_start..].iter_mut().for_each(|c| *c = 1.0);
        tableau.set_costs(&phase1);

        match tableau.optimize(width, max_iterations, &mut iterations) {
            PhaseOutcome::Optimal => {}
            PhaseOutcome::IterationLimit => {
                return Solution::without_values(SolutionStatus::ResourceExhausted)
                    .with_stats(iterations, 0);
            }
            // Phase 1 is bounded below by zero.
            PhaseOutcome::Unbounded => {
                return Solution::without_values(SolutionStatus::Infeasible)
                    .with_stats(iterations, 0);
            }
        }

        let infeasibility = tableau.objective_value();
        trace!(infeasibility, iterations, "simplex phase 1 finished");
        // Each artificial measures the violation of its own row, in that row's units.
        let violated = tableau
            .basis
            .iter()
            .enumerate()
            .filter(|&(_, &col)| col >= art_start)
            .any(|(row, &col)| tableau.rhs(row) > art_tolerance[col - art_start]);
        if violated {
            return Solution::without_values(SolutionStatus::Infeasible).with_stats(iterations, 0);
        }

        drive_out_artificials(&mut tableau, art_start, tol);
    }

    let mut phase2 = vec![0.0; width];
    let mut constant = 0.0;
    for (&c, map) in model.objective.iter().zip(&maps) {
        let c = match model.sense {
            ObjectiveSense::Minimize => c,
            ObjectiveSense::Maximize => -c,
        };
        match *map {
            ColumnMap::Shifted { col, offset } => {
                phase2[col] += c;
                constant += c * offset;
            }
            ColumnMap::Mirrored { col, offset } => {
                phase2[col] -= c;
                constant += c * offset;
            }
            ColumnMap::Split { pos, neg } => {
                phase2[pos] += c;
                phase2[neg] -= c;
            }
        }
    }
    tableau.set_costs(&phase2);

    let outcome = tableau.optimize(art_start, max_iterations, &mut iterations);
    trace!(
        ?outcome,
        iterations,
        internal_objective = tableau.objective_value() + constant,
        "simplex phase 2 finished"
    );

    match outcome {
        PhaseOutcome::Optimal => {
            let columns = tableau.column_values();
            let values: Vec<f64> = maps.iter().map(|m| m.value(&columns)).collect();
            let objective = model.objective_value(&values);
            Solution::optimal(values, objective).with_stats(iterations, 0)
        }
        PhaseOutcome::Unbounded => {
            Solution::without_values(SolutionStatus::Unbounded).with_stats(iterations, 0)
        }
        PhaseOutcome::IterationLimit => {
            Solution::without_values(SolutionStatus::ResourceExhausted).with_stats(iterations, 0)
        }
    }
}

/// Pivot basic artificial variables out of the basis after phase 1.
///
/// A row whose non-artificial entries are all zero is redundant; its
/// artificial stays basic at zero and can never change value.
fn drive_out_artificials(tableau: &mut Tableau, art_start: usize, tol: f64) {
    for row in 0..tableau.rows.len() {
        if tableau.basis[row] < art_start {
            continue;
        }
        let replacement = tableau.rows[row][..art_start]
            .iter()
            .enumerate()
            .filter(|(_, a)| a.abs() > PIVOT_TOL)
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(j, _)| j);
        if let Some(col) = replacement {
            tableau.pivot(row, col);
        }
    }

    let width = tableau.width;
    for row in &mut tableau.rows {
        if row[width] < 0.0 && row[width] > -tol {
            row[width] = 0.0;
        }
    }
}
