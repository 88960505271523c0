//! Model builder: validates a request and compiles it into a [`Model`].
//!
//! Variable layout of the compiled model:
//!
//! ```text
//! 0 .. N       spend[i]   continuous, bounds [minSpend_i, maxSpend_i]
//! N .. 2N      used[i]    binary, only when minChannelsUsed is set
//! ```
//!
//! Rows: the budget row, per-channel revenue rows, and for the exposure
//! constraint the link rows `spend_i <= U_i * used_i`,
//! `spend_i >= L_i * used_i` plus `sum(used_i) >= minChannelsUsed`.
//!
//! `U_i` is the channel's spend capacity. `L_i` is the larger of its minimum
//! spend and a small multiple of the tolerance, lowered to `U_i` when the
//! capacity itself is above the tolerance.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::channel::{ChannelSpec, GlobalConstraints};
use crate::domain::constraint::{Constraint, VariableBounds};
use crate::domain::error::ValidationError;
use crate::domain::model::{Model, ObjectiveSense};

/// Multiple of the tolerance a used channel must receive, so that it counts
/// as used after thresholding.
const USED_SPEND_FACTOR: f64 = 10.0;

/// A model together with the variable indices of each channel.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    /// The solver-facing model.
    pub model: Model,
    /// Index of `spend[i]` for each channel, in request order.
    pub spend_vars: Vec<usize>,
    /// Index of `used[i]` for each channel; empty for pure LPs.
    pub used_vars: Vec<usize>,
}

/// Validate a request and compile it into an optimization model.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found. A request that fails here is
/// never handed to a solver.
pub fn build_model(
    channels: &[ChannelSpec],
    constraints: &GlobalConstraints,
) -> Result<CompiledModel, ValidationError> {
    validate(channels, constraints)?;

    let n = channels.len();
    let budget = constraints.total_budget;
    let tolerance = constraints.tolerance();
    let mut model = Model::new(ObjectiveSense::Maximize, tolerance);

    let spend_vars: Vec<usize> = channels
        .iter()
        .map(|c| {
            let bounds = VariableBounds {
                lower: Some(c.min_spend.unwrap_or(0.0)),
                upper: c.max_spend,
            };
            model.add_variable(format!("spend[{}]", c.id), c.roi, bounds)
        })
        .collect();

    let used_vars: Vec<usize> = if constraints.min_channels_used.is_some() {
        channels
            .iter()
            .map(|c| model.add_binary(format!("used[{}]", c.id), 0.0))
            .collect()
    } else {
        Vec::new()
    };

    let width = model.num_vars();
    let row = |entries: &[(usize, f64)]| {
        let mut coefficients = vec![0.0; width];
        for &(j, a) in entries {
            coefficients[j] = a;
        }
        coefficients
    };

    let budget_coefficients = row(&spend_vars.iter().map(|&j| (j, 1.0)).collect::<Vec<_>>());
    let budget_row = if constraints.spend_entire_budget {
        Constraint::eq(budget_coefficients, budget)
    } else {
        Constraint::leq(budget_coefficients, budget)
    };
    model.add_constraint(budget_row.labeled("budget"));

    for (channel, &spend) in channels.iter().zip(&spend_vars) {
        if let Some(min_revenue) = channel.min_revenue {
            model.add_constraint(
                Constraint::geq(row(&[(spend, channel.roi)]), min_revenue)
                    .labeled(format!("min_revenue[{}]", channel.id)),
            );
        }
        if let Some(max_revenue) = channel.max_revenue {
            model.add_constraint(
                Constraint::leq(row(&[(spend, channel.roi)]), max_revenue)
                    .labeled(format!("max_revenue[{}]", channel.id)),
            );
        }
    }

    if let Some(required) = constraints.min_channels_used {
        for ((channel, &spend), &used) in channels.iter().zip(&spend_vars).zip(&used_vars) {
            let upper = channel.spend_capacity(budget);
            let mut lower = channel
                .min_spend
                .unwrap_or(0.0)
                .max(USED_SPEND_FACTOR * tolerance);
            // A channel whose capacity counts as spend can always be used at it.
            if upper > tolerance {
                lower = lower.min(upper);
            }

            model.add_constraint(
                Constraint::leq(row(&[(spend, 1.0), (used, -upper)]), 0.0)
                    .labeled(format!("link_upper[{}]", channel.id)),
            );
            model.add_constraint(
                Constraint::geq(row(&[(spend, 1.0), (used, -lower)]), 0.0)
                    .labeled(format!("link_lower[{}]", channel.id)),
            );
        }

        let exposure = row(&used_vars.iter().map(|&j| (j, 1.0)).collect::<Vec<_>>());
        model.add_constraint(
            Constraint::geq(exposure, required as f64).labeled("min_channels_used"),
        );
    }

    debug!(
        channels = n,
        variables = model.num_vars(),
        rows = model.constraints.len(),
        binaries = model.binary_vars.len(),
        tolerance,
        "model compiled"
    );

    Ok(CompiledModel {
        model,
        spend_vars,
        used_vars,
    })
}

/// Check every input invariant, reporting the first violation.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(
    channels: &[ChannelSpec],
    constraints: &GlobalConstraints,
) -> Result<(), ValidationError> {
    if channels.is_empty() {
        return Err(ValidationError::NoChannels);
    }

    let budget = constraints.total_budget;
    if !budget.is_finite() || budget < 0.0 {
        return Err(ValidationError::InvalidBudget { budget });
    }

    let mut seen = HashSet::with_capacity(channels.len());
    for (index, channel) in channels.iter().enumerate() {
        if channel.id.is_empty() {
            return Err(ValidationError::EmptyId { index });
        }
        if !seen.insert(channel.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: channel.id.clone(),
            });
        }
        validate_channel(channel)?;
    }

    match constraints.min_channels_used {
        Some(0) => Err(ValidationError::ZeroChannelsUsed),
        Some(required) if required > channels.len() => Err(ValidationError::TooManyChannelsRequired {
            required,
            available: channels.len(),
        }),
        _ => Ok(()),
    }
}

fn validate_channel(channel: &ChannelSpec) -> Result<(), ValidationError> {
    let fields = [
        ("roi", Some(channel.roi)),
        ("minSpend", channel.min_spend),
        ("maxSpend", channel.max_spend),
        ("minRevenue", channel.min_revenue),
        ("maxRevenue", channel.max_revenue),
    ];

    for (field, value) in fields {
        let Some(value) = value else { continue };
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                channel: channel.id.clone(),
                field,
                value,
            });
        }
        if value < 0.0 {
            return Err(if field == "roi" {
                ValidationError::NegativeRoi {
                    channel: channel.id.clone(),
                    roi: value,
                }
            } else {
                ValidationError::NegativeBound {
                    channel: channel.id.clone(),
                    field,
                    value,
                }
            });
        }
    }

    if let (Some(min), Some(max)) = (channel.min_spend, channel.max_spend) {
        if min > max {
            return Err(ValidationError::InvertedSpendBounds {
                channel: channel.id.clone(),
                min,
                max,
            });
        }
    }

    if let (Some(min), Some(max)) = (channel.min_revenue, channel.max_revenue) {
        if min > max {
            return Err(ValidationError::InvertedRevenueBounds {
                channel: channel.id.clone(),
                min,
                max,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::ConstraintSense;

    fn two_channels() -> Vec<ChannelSpec> {
        vec![ChannelSpec::new("search", 2.0), ChannelSpec::new("social", 1.0)]
    }

    #[test]
    fn compiles_objective_budget_and_bounds() {
        let channels = vec![
            ChannelSpec::new("search", 2.0).with_min_spend(10.0),
            ChannelSpec::new("social", 1.0).with_max_spend(40.0),
        ];

        let compiled = build_model(&channels, &GlobalConstraints::new(100.0)).expect("build");
        let model = &compiled.model;

        assert_eq!(model.objective, vec![2.0, 1.0]);
        assert_eq!(model.sense, ObjectiveSense::Maximize);
        assert_eq!(model.bounds[0], VariableBounds { lower: Some(10.0), upper: None });
        assert_eq!(model.bounds[1], VariableBounds { lower: Some(0.0), upper: Some(40.0) });
        assert_eq!(model.constraints.len(), 1);
        assert_eq!(model.constraints[0].label, "budget");
        assert_eq!(model.constraints[0].sense, ConstraintSense::LessEqual);
        assert_eq!(model.constraints[0].coefficients, vec![1.0, 1.0]);
        assert!(!model.is_mixed_integer());
        assert!(compiled.used_vars.is_empty());
    }

    #[test]
    fn unset_and_zero_bounds_differ() {
        let channels = vec![
            ChannelSpec::new("a", 1.0).with_max_spend(0.0),
            ChannelSpec::new("b", 1.0),
        ];

        let model = build_model(&channels, &GlobalConstraints::new(10.0))
            .expect("build")
            .model;

        assert_eq!(model.bounds[0].upper, Some(0.0));
        assert_eq!(model.bounds[1].upper, None);
    }

    #[test]
    fn compiles_revenue_rows() {
        let channels = vec![ChannelSpec::new("a", 4.0)
            .with_min_revenue(40.0)
            .with_max_revenue(200.0)];

        let model = build_model(&channels, &GlobalConstraints::new(100.0))
            .expect("build")
            .model;

        let min = &model.constraints[1];
        assert_eq!(min.label, "min_revenue[a]");
        assert_eq!(min.sense, ConstraintSense::GreaterEqual);
        assert_eq!((min.coefficients[0], min.rhs), (4.0, 40.0));
        let max = &model.constraints[2];
        assert_eq!(max.sense, ConstraintSense::LessEqual);
        assert_eq!(max.rhs, 200.0);
    }

    #[test]
    fn exposure_constraint_adds_binaries_and_links() {
        let channels = vec![
            ChannelSpec::new("a", 5.0).with_max_spend(60.0),
            ChannelSpec::new("b", 1.0).with_min_spend(5.0),
        ];
        let constraints = GlobalConstraints::new(100.0).with_min_channels_used(2);

        let compiled = build_model(&channels, &constraints).expect("build");
        let model = &compiled.model;

        assert_eq!(compiled.used_vars, vec![2, 3]);
        assert_eq!(model.binary_vars, vec![2, 3]);
        assert_eq!(model.objective[2..], [0.0, 0.0]);

        let upper_a = model
            .constraints
            .iter()
            .find(|c| c.label == "link_upper[a]")
            .expect("link row");
        assert_eq!(upper_a.coefficients, vec![1.0, 0.0, -60.0, 0.0]);

        let upper_b = model
            .constraints
            .iter()
            .find(|c| c.label == "link_upper[b]")
            .expect("link row");
        assert_eq!(upper_b.coefficients[3], -100.0);

        let lower_b = model
            .constraints
            .iter()
            .find(|c| c.label == "link_lower[b]")
            .expect("link row");
        assert_eq!(lower_b.coefficients[3], -5.0);

        let lower_a = model
            .constraints
            .iter()
            .find(|c| c.label == "link_lower[a]")
            .expect("link row");
        assert!(lower_a.coefficients[2] < 0.0);

        let exposure = model.constraints.last().expect("exposure row");
        assert_eq!(exposure.label, "min_channels_used");
        assert_eq!(exposure.coefficients, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(exposure.rhs, 2.0);
    }

    #[test]
    fn used_threshold_never_exceeds_capacity() {
        let channels = vec![
            ChannelSpec::new("a", 2.0),
            ChannelSpec::new("tiny", 1.0).with_max_spend(5e-4),
            ChannelSpec::new("closed", 1.0).with_max_spend(0.0),
            ChannelSpec::new("capped", 4.0).with_max_revenue(20.0),
        ];
        let constraints = GlobalConstraints::new(100.0).with_min_channels_used(2);

        let compiled = build_model(&channels, &constraints).expect("build");
        let link = |label: &str, used: usize| {
            compiled
                .model
                .constraints
                .iter()
                .find(|c| c.label == label)
                .map(|c| -c.coefficients[compiled.used_vars[used]])
                .expect("link row")
        };

        assert_eq!(link("link_upper[tiny]", 1), 5e-4);
        assert_eq!(link("link_lower[tiny]", 1), 5e-4);
        // At or below the tolerance a channel cannot count as used.
        assert_eq!(link("link_upper[closed]", 2), 0.0);
        assert!(link("link_lower[closed]", 2) > 0.0);
        assert_eq!(link("link_upper[capped]", 3), 5.0);
        assert!(link("link_lower[a]", 0) < 1e-2);
    }

    #[test]
    fn entire_budget_uses_equality() {
        let constraints = GlobalConstraints::new(50.0).with_entire_budget();
        let model = build_model(&two_channels(), &constraints).expect("build").model;
        assert_eq!(model.constraints[0].sense, ConstraintSense::Equal);
    }

    #[test]
    fn rejects_invalid_requests() {
        let budget = GlobalConstraints::new(100.0);
        let cases: Vec<(Vec<ChannelSpec>, GlobalConstraints, ValidationError)> = vec![
            (vec![], budget.clone(), ValidationError::NoChannels),
            (
                vec![ChannelSpec::new("a", -0.5)],
                budget.clone(),
                ValidationError::NegativeRoi {
                    channel: "a".into(),
                    roi: -0.5,
                },
            ),
            (
                vec![ChannelSpec::new("a", 1.0).with_min_spend(5.0).with_max_spend(2.0)],
                budget.clone(),
                ValidationError::InvertedSpendBounds {
                    channel: "a".into(),
                    min: 5.0,
                    max: 2.0,
                },
            ),
            (
                vec![ChannelSpec::new("a", 1.0)
                    .with_min_revenue(9.0)
                    .with_max_revenue(3.0)],
                budget.clone(),
                ValidationError::InvertedRevenueBounds {
                    channel: "a".into(),
                    min: 9.0,
                    max: 3.0,
                },
            ),
            (
                vec![ChannelSpec::new("a", 1.0), ChannelSpec::new("a", 2.0)],
                budget.clone(),
                ValidationError::DuplicateId { id: "a".into() },
            ),
            (
                vec![ChannelSpec::new("", 1.0)],
                budget.clone(),
                ValidationError::EmptyId { index: 0 },
            ),
            (
                two_channels(),
                GlobalConstraints::new(-1.0),
                ValidationError::InvalidBudget { budget: -1.0 },
            ),
            (
                two_channels(),
                budget.clone().with_min_channels_used(3),
                ValidationError::TooManyChannelsRequired {
                    required: 3,
                    available: 2,
                },
            ),
            (
                two_channels(),
                budget.clone().with_min_channels_used(0),
                ValidationError::ZeroChannelsUsed,
            ),
            (
                vec![ChannelSpec::new("a", 1.0).with_max_spend(-3.0)],
                budget.clone(),
                ValidationError::NegativeBound {
                    channel: "a".into(),
                    field: "maxSpend",
                    value: -3.0,
                },
            ),
        ];

        for (channels, constraints, expected) in cases {
            assert_eq!(build_model(&channels, &constraints).unwrap_err(), expected);
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        let channels = vec![ChannelSpec::new("a", f64::INFINITY)];
        assert!(matches!(
            build_model(&channels, &GlobalConstraints::new(1.0)),
            Err(ValidationError::NonFinite { field: "roi", .. })
        ));
        assert!(matches!(
            build_model(&two_channels(), &GlobalConstraints::new(f64::NAN)),
            Err(ValidationError::InvalidBudget { .. })
        ));
    }
}
