//! Linear constraint types for the allocation model.
//!
//! These types describe rows and variable bounds of a compiled model and are
//! shared by every solver backend.

use serde::{Deserialize, Serialize};

/// A single linear constraint: `sum(coeffs[i] * x[i]) {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable.
    pub coefficients: Vec<f64>,
    /// Constraint sense (>=, <=, =).
    pub sense: ConstraintSense,
    /// Right-hand side value.
    pub rhs: f64,
    /// Human-readable row name, used in logs.
    pub label: String,
}

impl Constraint {
    /// Create a >= constraint.
    #[must_use]
    pub fn geq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::with_sense(coefficients, ConstraintSense::GreaterEqual, rhs)
    }

    /// Create a <= constraint.
    #[must_use]
    pub fn leq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::with_sense(coefficients, ConstraintSense::LessEqual, rhs)
    }

    /// Create an = constraint.
    #[must_use]
    pub fn eq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::with_sense(coefficients, ConstraintSense::Equal, rhs)
    }

    fn with_sense(coefficients: Vec<f64>, sense: ConstraintSense, rhs: f64) -> Self {
        Self {
            coefficients,
            sense,
            rhs,
            label: String::new(),
        }
    }

    /// Attach a row name.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Evaluate the left-hand side at `values`.
    #[must_use]
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Return `true` if `values` satisfies this row within `tolerance`.
    #[must_use]
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.activity(values);
        match self.sense {
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Less than or equal (<=).
    LessEqual,
    /// Equal (=).
    Equal,
}

impl ConstraintSense {
    /// The sense obtained by multiplying both sides by -1.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::GreaterEqual => Self::LessEqual,
            Self::LessEqual => Self::GreaterEqual,
            Self::Equal => Self::Equal,
        }
    }
}

/// Bounds on a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Lower bound (None = -infinity).
    pub lower: Option<f64>,
    /// Upper bound (None = +infinity).
    pub upper: Option<f64>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: Some(0.0),
            upper: Some(1.0),
        }
    }

    /// Free variable (no bounds).
    #[must_use]
    pub const fn free() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Non-negative variable [0, +inf).
    #[must_use]
    pub fn non_negative() -> Self {
        Self::default()
    }

    /// Bounded variable [lower, upper].
    #[must_use]
    pub const fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Variable fixed to a single value.
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self::bounded(value, value)
    }

    /// Return `true` if `value` lies within these bounds up to `tolerance`.
    #[must_use]
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        self.lower.map_or(true, |l| value >= l - tolerance)
            && self.upper.map_or(true, |u| value <= u + tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfaction_respects_tolerance() {
        let row = Constraint::leq(vec![1.0, 1.0], 10.0);
        assert!(row.is_satisfied(&[5.0, 5.0], 0.0));
        assert!(row.is_satisfied(&[5.0, 5.0005], 1e-3));
        assert!(!row.is_satisfied(&[5.0, 5.1], 1e-3));

        let row = Constraint::eq(vec![2.0], 4.0);
        assert!(row.is_satisfied(&[2.0], 1e-9));
        assert!(!row.is_satisfied(&[2.1], 1e-9));
    }

    #[test]
    fn bounds_containment() {
        assert!(VariableBounds::binary().contains(1.0, 0.0));
        assert!(!VariableBounds::binary().contains(1.1, 1e-6));
        assert!(VariableBounds::free().contains(-1e9, 0.0));
        assert!(VariableBounds::non_negative().contains(-1e-7, 1e-6));
    }

    #[test]
    fn flipped_sense() {
        assert_eq!(
            ConstraintSense::GreaterEqual.flipped(),
            ConstraintSense::LessEqual
        );
        assert_eq!(ConstraintSense::Equal.flipped(), ConstraintSense::Equal);
    }
}
