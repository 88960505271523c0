//! Result interpreter: turns raw solver output into an [`AllocationResult`].

use std::collections::BTreeMap;

use super::builder::CompiledModel;
use crate::domain::allocation::{
    AllocationResult, AllocationStatus, ChannelBreakdown, Infeasibility, SolveStats,
};
use crate::domain::channel::{ChannelSpec, GlobalConstraints};
use crate::port::solver::{Solution, SolutionStatus};

/// Map a solver status onto the public allocation status.
#[must_use]
pub const fn allocation_status(status: SolutionStatus) -> AllocationStatus {
    match status {
        SolutionStatus::Optimal => AllocationStatus::Optimal,
        SolutionStatus::Infeasible => AllocationStatus::Infeasible,
        SolutionStatus::Unbounded => AllocationStatus::Unbounded,
        SolutionStatus::ResourceExhausted => AllocationStatus::ResourceExhausted,
    }
}

/// Snap a raw spend to zero when it lies within `tolerance` of it, and clamp
/// negative round-off.
#[must_use]
pub fn snap_spend(raw: f64, tolerance: f64) -> f64 {
    if raw <= tolerance {
        0.0
    } else {
        raw
    }
}

/// Build the caller-facing result for one solved request.
///
/// An allocation is attached whenever the solver returned values, which
/// covers `Optimal` and `ResourceExhausted` with an incumbent. Infeasible
/// results carry an advisory diagnostic instead.
#[must_use]
pub fn interpret(
    solution: &Solution,
    compiled: &CompiledModel,
    channels: &[ChannelSpec],
    constraints: &GlobalConstraints,
    backend: &str,
) -> AllocationResult {
    let tolerance = constraints.tolerance();
    let status = allocation_status(solution.status);
    let even_spend = constraints.total_budget / channels.len() as f64;

    let spends: Option<Vec<f64>> = solution.values.as_ref().map(|values| {
        compiled
            .spend_vars
            .iter()
            .map(|&j| snap_spend(values[j], tolerance))
            .collect()
    });

    let breakdown: Vec<ChannelBreakdown> = channels
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            let spend = spends.as_ref().map_or(0.0, |s| s[i]);
            ChannelBreakdown {
                id: channel.id.clone(),
                roi: channel.roi,
                spend,
                revenue: spend * channel.roi,
                even_split_spend: even_spend,
                even_split_revenue: even_spend * channel.roi,
                used: spend > tolerance,
            }
        })
        .collect();

    let allocation = spends.as_ref().map(|_| {
        breakdown
            .iter()
            .map(|line| (line.id.clone(), line.spend))
            .collect::<BTreeMap<_, _>>()
    });

    let diagnostic = match status {
        AllocationStatus::Infeasible => Some(diagnose(channels, constraints).to_string()),
        _ => None,
    };

    AllocationResult {
        status,
        allocation,
        total_spend: breakdown.iter().map(|line| line.spend).sum(),
        total_revenue: breakdown.iter().map(|line| line.revenue).sum(),
        even_split_revenue: breakdown.iter().map(|line| line.even_split_revenue).sum(),
        channels_used: breakdown.iter().filter(|line| line.used).count(),
        breakdown,
        diagnostic,
        stats: SolveStats {
            backend: backend.to_string(),
            lp_iterations: solution.iterations,
            nodes_explored: solution.nodes,
        },
    }
}

/// Explain an infeasible request with cheap necessary-condition checks.
///
/// Checks run in a fixed order and the first one that fires is returned.
#[must_use]
pub fn diagnose(channels: &[ChannelSpec], constraints: &GlobalConstraints) -> Infeasibility {
    let budget = constraints.total_budget;
    let tol = constraints.tolerance();

    let committed: f64 = channels.iter().filter_map(|c| c.min_spend).sum();
    if committed > budget + tol {
        return Infeasibility::MinSpendExceedsBudget { committed, budget };
    }

    for channel in channels {
        let Some(min_revenue) = channel.min_revenue else {
            continue;
        };
        if min_revenue <= tol {
            continue;
        }
        let available = channel.max_spend.map_or(budget, |max| max.min(budget));
        let required = if channel.roi > 0.0 {
            min_revenue / channel.roi
        } else {
            f64::INFINITY
        };
        if required > available + tol {
            return Infeasibility::RevenueUnreachable {
                channel: channel.id.clone(),
                required,
                available,
            };
        }
    }

    for channel in channels {
        if let (Some(min_spend), Some(max_revenue)) = (channel.min_spend, channel.max_revenue) {
            if min_spend * channel.roi > max_revenue + tol {
                return Infeasibility::RevenueCapBelowMinSpend {
                    channel: channel.id.clone(),
                };
            }
        }
    }

    if let Some(required) = constraints.min_channels_used {
        let available = channels
            .iter()
            .filter(|c| c.spend_capacity(budget) > tol)
            .count();
        if available < required {
            return Infeasibility::ExposureUnreachable {
                required,
                available,
            };
        }
    }

    if constraints.spend_entire_budget {
        let capacity: f64 = channels.iter().map(|c| c.spend_capacity(budget)).sum();
        if capacity < budget - tol {
            return Infeasibility::BudgetNotAbsorbed { capacity, budget };
        }
    }

    Infeasibility::Unexplained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::build_model;

    fn compile(channels: &[ChannelSpec], constraints: &GlobalConstraints) -> CompiledModel {
        build_model(channels, constraints).expect("valid request")
    }

    #[test]
    fn snaps_round_off_to_zero() {
        assert_eq!(snap_spend(-1e-9, 1e-6), 0.0);
        assert_eq!(snap_spend(5e-7, 1e-6), 0.0);
        assert_eq!(snap_spend(-3.0, 1e-6), 0.0);
        assert_eq!(snap_spend(2.5, 1e-6), 2.5);
    }

    #[test]
    fn interprets_optimal_solution() {
        let channels = vec![ChannelSpec::new("a", 2.0), ChannelSpec::new("b", 1.0)];
        let constraints = GlobalConstraints::new(100.0);
        let compiled = compile(&channels, &constraints);
        let solution = Solution::optimal(vec![100.0, -1e-10], 200.0).with_stats(3, 0);

        let result = interpret(&solution, &compiled, &channels, &constraints, "native");

        assert_eq!(result.status, AllocationStatus::Optimal);
        assert_eq!(result.spend("a"), Some(100.0));
        assert_eq!(result.spend("b"), Some(0.0));
        assert_eq!(result.total_spend, 100.0);
        assert_eq!(result.total_revenue, 200.0);
        assert_eq!(result.even_split_revenue, 150.0);
        assert_eq!(result.channels_used, 1);
        assert_eq!(result.breakdown[1].even_split_spend, 50.0);
        assert!(!result.breakdown[1].used);
        assert_eq!(result.stats.backend, "native");
        assert_eq!(result.stats.lp_iterations, 3);
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn infeasible_solution_has_no_allocation() {
        let channels = vec![
            ChannelSpec::new("a", 1.0).with_min_spend(80.0),
            ChannelSpec::new("b", 1.0).with_min_spend(80.0),
        ];
        let constraints = GlobalConstraints::new(100.0);
        let compiled = compile(&channels, &constraints);
        let solution = Solution::without_values(SolutionStatus::Infeasible);

        let result = interpret(&solution, &compiled, &channels, &constraints, "native");

        assert_eq!(result.status, AllocationStatus::Infeasible);
        assert!(result.allocation.is_none());
        assert_eq!(result.total_revenue, 0.0);
        assert_eq!(result.even_split_revenue, 100.0);
        let diagnostic = result.diagnostic.expect("diagnostic");
        assert!(diagnostic.contains("minimum spend commitments exceed total budget"));
    }

    #[test]
    fn exhausted_search_keeps_incumbent() {
        let channels = vec![ChannelSpec::new("a", 3.0), ChannelSpec::new("b", 1.0)];
        let constraints = GlobalConstraints::new(10.0).with_min_channels_used(2);
        let compiled = compile(&channels, &constraints);
        let solution = Solution {
            status: SolutionStatus::ResourceExhausted,
            values: Some(vec![6.0, 4.0, 1.0, 1.0]),
            objective: Some(22.0),
            iterations: 9,
            nodes: 5,
        };

        let result = interpret(&solution, &compiled, &channels, &constraints, "native");

        assert_eq!(result.status, AllocationStatus::ResourceExhausted);
        assert_eq!(result.spend("a"), Some(6.0));
        assert_eq!(result.channels_used, 2);
        assert_eq!(result.stats.nodes_explored, 5);
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn diagnoses_unreachable_revenue() {
        let channels = vec![
            ChannelSpec::new("a", 1.0),
            ChannelSpec::new("b", 2.0)
                .with_max_spend(10.0)
                .with_min_revenue(50.0),
        ];

        let found = diagnose(&channels, &GlobalConstraints::new(100.0));

        assert_eq!(
            found,
            Infeasibility::RevenueUnreachable {
                channel: "b".into(),
                required: 25.0,
                available: 10.0,
            }
        );
    }

    #[test]
    fn diagnoses_zero_roi_with_revenue_floor() {
        let channels = vec![ChannelSpec::new("dead", 0.0).with_min_revenue(1.0)];
        let found = diagnose(&channels, &GlobalConstraints::new(100.0));
        assert!(matches!(found, Infeasibility::RevenueUnreachable { ref channel, .. } if channel == "dead"));
    }

    #[test]
    fn diagnoses_revenue_cap_below_min_spend() {
        let channels = vec![ChannelSpec::new("a", 4.0)
            .with_min_spend(10.0)
            .with_max_revenue(20.0)];
        assert_eq!(
            diagnose(&channels, &GlobalConstraints::new(100.0)),
            Infeasibility::RevenueCapBelowMinSpend { channel: "a".into() }
        );
    }

    #[test]
    fn diagnoses_unreachable_exposure() {
        let channels = vec![
            ChannelSpec::new("a", 1.0),
            ChannelSpec::new("b", 1.0).with_max_spend(0.0),
        ];
        let constraints = GlobalConstraints::new(100.0).with_min_channels_used(2);
        assert_eq!(
            diagnose(&channels, &constraints),
            Infeasibility::ExposureUnreachable {
                required: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn diagnoses_budget_not_absorbed() {
        let channels = vec![
            ChannelSpec::new("a", 1.0).with_max_spend(30.0),
            ChannelSpec::new("b", 1.0).with_max_spend(20.0),
        ];
        let constraints = GlobalConstraints::new(100.0).with_entire_budget();
        assert_eq!(
            diagnose(&channels, &constraints),
            Infeasibility::BudgetNotAbsorbed {
                capacity: 50.0,
                budget: 100.0,
            }
        );
    }

    #[test]
    fn min_spend_check_wins_over_later_checks() {
        let channels = vec![
            ChannelSpec::new("a", 0.0)
                .with_min_spend(200.0)
                .with_min_revenue(5.0),
        ];
        assert!(matches!(
            diagnose(&channels, &GlobalConstraints::new(100.0)),
            Infeasibility::MinSpendExceedsBudget { .. }
        ));
    }

    #[test]
    fn falls_back_to_unexplained() {
        let channels = vec![ChannelSpec::new("a", 1.0)];
        assert_eq!(
            diagnose(&channels, &GlobalConstraints::new(100.0)),
            Infeasibility::Unexplained
        );
    }
}
