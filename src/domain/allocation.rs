//! Allocation results returned to callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of an allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationStatus {
    /// A provably optimal allocation was found.
    Optimal,
    /// No allocation satisfies every constraint.
    Infeasible,
    /// The objective is unbounded. Indicates a model builder defect.
    Unbounded,
    /// The search budget ran out before optimality was proven.
    ResourceExhausted,
}

impl AllocationStatus {
    /// Lowercase name for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::ResourceExhausted => "resource exhausted",
        }
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-channel line of an allocation, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBreakdown {
    /// Channel identifier.
    pub id: String,
    /// Revenue per unit of spend.
    pub roi: f64,
    /// Optimized spend (0 when no allocation is available).
    pub spend: f64,
    /// `spend * roi`.
    pub revenue: f64,
    /// Spend under an even split of the budget.
    pub even_split_spend: f64,
    /// Revenue under an even split of the budget.
    pub even_split_revenue: f64,
    /// Whether spend exceeds the feasibility tolerance.
    pub used: bool,
}

/// Solver statistics attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveStats {
    /// Name of the solver backend.
    pub backend: String,
    /// Simplex pivots across all LP solves.
    pub lp_iterations: usize,
    /// Branch-and-bound nodes solved (0 for pure LPs).
    pub nodes_explored: usize,
}

/// Result of one allocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// Solver outcome.
    pub status: AllocationStatus,

    /// Channel id to spend. Present when a feasible allocation was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<BTreeMap<String, f64>>,

    /// Sum of allocated spend.
    pub total_spend: f64,

    /// `sum(spend_i * roi_i)` over the allocation.
    pub total_revenue: f64,

    /// Revenue of splitting the budget evenly across channels.
    pub even_split_revenue: f64,

    /// Number of channels with spend above the tolerance.
    pub channels_used: usize,

    /// Per-channel details in request order.
    pub breakdown: Vec<ChannelBreakdown>,

    /// Advisory explanation for infeasible requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    /// Solver statistics.
    pub stats: SolveStats,
}

impl AllocationResult {
    /// Return `true` if the allocation is provably optimal.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == AllocationStatus::Optimal
    }

    /// Spend allocated to `id`, if an allocation exists.
    #[must_use]
    pub fn spend(&self, id: &str) -> Option<f64> {
        self.allocation.as_ref()?.get(id).copied()
    }

    /// Revenue gained over the even-split baseline.
    #[must_use]
    pub fn lift(&self) -> f64 {
        self.total_revenue - self.even_split_revenue
    }
}

/// Cheap explanation of why a request is infeasible.
///
/// Advisory only: the checks are necessary conditions, so a request may be
/// infeasible for a reason none of them catch.
#[derive(Debug, Clone, PartialEq)]
pub enum Infeasibility {
    /// Sum of minimum spends is larger than the budget.
    MinSpendExceedsBudget {
        /// Sum of `minSpend` across channels.
        committed: f64,
        /// Total budget.
        budget: f64,
    },
    /// A channel cannot reach its minimum revenue within its spend cap.
    RevenueUnreachable {
        /// Channel identifier.
        channel: String,
        /// Spend needed to reach `minRevenue`.
        required: f64,
        /// Largest spend the channel can take.
        available: f64,
    },
    /// A channel's minimum spend already overshoots its maximum revenue.
    RevenueCapBelowMinSpend {
        /// Channel identifier.
        channel: String,
    },
    /// Fewer channels can take positive spend than required.
    ExposureUnreachable {
        /// Channels required by `minChannelsUsed`.
        required: usize,
        /// Channels with positive spend capacity.
        available: usize,
    },
    /// Every channel is capped and the caps sum to less than the budget.
    BudgetNotAbsorbed {
        /// Sum of per-channel caps.
        capacity: f64,
        /// Total budget.
        budget: f64,
    },
    /// None of the cheap checks apply.
    Unexplained,
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinSpendExceedsBudget { committed, budget } => write!(
                f,
                "minimum spend commitments exceed total budget ({committed} > {budget})"
            ),
            Self::RevenueUnreachable {
                channel,
                required,
                available,
            } => write!(
                f,
                "channel '{channel}' needs spend {required} to reach its minimum revenue but can take at most {available}"
            ),
            Self::RevenueCapBelowMinSpend { channel } => write!(
                f,
                "channel '{channel}' exceeds its maximum revenue at its minimum spend"
            ),
            Self::ExposureUnreachable {
                required,
                available,
            } => write!(
                f,
                "{required} channels must receive spend but only {available} can"
            ),
            Self::BudgetNotAbsorbed { capacity, budget } => write!(
                f,
                "channel spend caps total {capacity}, less than the budget {budget} that must be spent"
            ),
            Self::Unexplained => f.write_str("constraints cannot all be satisfied"),
        }
    }
}
