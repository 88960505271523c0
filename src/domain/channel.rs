//! Channel and constraint records supplied by callers.
//!
//! These are plain data records, serializable to and from JSON or TOML with
//! camelCase keys. Optional bounds use `Option` so that an explicit `0` is
//! never confused with "no bound".
//!
//! # Examples
//!
//! ```
//! use budget_allocator::domain::channel::{ChannelSpec, GlobalConstraints};
//!
//! let search = ChannelSpec::new("search", 2.5).with_min_spend(100.0);
//! let social = ChannelSpec::new("social", 1.8).with_max_spend(400.0);
//! let constraints = GlobalConstraints::new(1_000.0).with_min_channels_used(2);
//!
//! assert_eq!(search.min_spend, Some(100.0));
//! assert_eq!(social.min_spend, None);
//! assert_eq!(constraints.min_channels_used, Some(2));
//! ```

use serde::{Deserialize, Serialize};

/// One advertising channel and its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSpec {
    /// Unique identifier within a request.
    pub id: String,

    /// Revenue generated per unit of spend.
    pub roi: f64,

    /// Lower bound on spend. `None` means unbounded below (spend stays >= 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_spend: Option<f64>,

    /// Upper bound on spend. `None` means no cap beyond the total budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_spend: Option<f64>,

    /// Lower bound on `spend * roi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_revenue: Option<f64>,

    /// Upper bound on `spend * roi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_revenue: Option<f64>,
}

impl ChannelSpec {
    /// Create a channel with no bounds beyond non-negative spend.
    #[must_use]
    pub fn new(id: impl Into<String>, roi: f64) -> Self {
        Self {
            id: id.into(),
            roi,
            min_spend: None,
            max_spend: None,
            min_revenue: None,
            max_revenue: None,
        }
    }

    /// Set the minimum spend.
    #[must_use]
    pub fn with_min_spend(mut self, value: f64) -> Self {
        self.min_spend = Some(value);
        self
    }

    /// Set the maximum spend.
    #[must_use]
    pub fn with_max_spend(mut self, value: f64) -> Self {
        self.max_spend = Some(value);
        self
    }

    /// Set the minimum revenue.
    #[must_use]
    pub fn with_min_revenue(mut self, value: f64) -> Self {
        self.min_revenue = Some(value);
        self
    }

    /// Set the maximum revenue.
    #[must_use]
    pub fn with_max_revenue(mut self, value: f64) -> Self {
        self.max_revenue = Some(value);
        self
    }

    /// Largest spend this channel can take under its own bounds and the budget.
    ///
    /// Considers `maxSpend`, `maxRevenue / roi` and `total_budget`, whichever
    /// is tightest.
    #[must_use]
    pub fn spend_capacity(&self, total_budget: f64) -> f64 {
        let mut cap = total_budget;
        if let Some(max) = self.max_spend {
            cap = cap.min(max);
        }
        if let Some(max_revenue) = self.max_revenue {
            if self.roi > 0.0 {
                cap = cap.min(max_revenue / self.roi);
            }
        }
        cap
    }
}

/// Constraints that apply across all channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConstraints {
    /// Upper bound on the sum of all spends.
    pub total_budget: f64,

    /// Minimum number of channels that must receive strictly positive spend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_channels_used: Option<usize>,

    /// Require the whole budget to be allocated (`=` instead of `<=`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub spend_entire_budget: bool,
}

impl GlobalConstraints {
    /// Create constraints with only a total budget.
    #[must_use]
    pub const fn new(total_budget: f64) -> Self {
        Self {
            total_budget,
            min_channels_used: None,
            spend_entire_budget: false,
        }
    }

    /// Require at least `count` channels to receive positive spend.
    #[must_use]
    pub const fn with_min_channels_used(mut self, count: usize) -> Self {
        self.min_channels_used = Some(count);
        self
    }

    /// Require the budget to be spent in full.
    #[must_use]
    pub const fn with_entire_budget(mut self) -> Self {
        self.spend_entire_budget = true;
        self
    }

    /// Feasibility tolerance for this request: `1e-6 * totalBudget`, floored at `1e-6`.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        (self.total_budget.abs() * 1e-6).max(1e-6)
    }
}

/// A complete allocation request as read by front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    /// Channels in display order.
    pub channels: Vec<ChannelSpec>,
    /// Cross-channel constraints.
    pub constraints: GlobalConstraints,
}

impl AllocationRequest {
    /// Bundle channels and constraints into a request.
    #[must_use]
    pub fn new(channels: Vec<ChannelSpec>, constraints: GlobalConstraints) -> Self {
        Self {
            channels,
            constraints,
        }
    }
}
