use budget_allocator::domain::{AllocationResult, ChannelSpec, GlobalConstraints};

/// Channels with the given ROIs and no bounds, named `c0`, `c1`, ...
pub fn channels_with_roi(rois: &[f64]) -> Vec<ChannelSpec> {
    rois.iter()
        .enumerate()
        .map(|(i, &roi)| ChannelSpec::new(format!("c{i}"), roi))
        .collect()
}

/// Check every bound of an allocation that claims to be feasible.
pub fn assert_feasible(
    result: &AllocationResult,
    channels: &[ChannelSpec],
    constraints: &GlobalConstraints,
) {
    let tol = constraints.tolerance() * 10.0;
    let allocation = result.allocation.as_ref().expect("allocation present");

    assert_eq!(allocation.len(), channels.len());
    let total: f64 = allocation.values().sum();
    assert!(
        total <= constraints.total_budget + tol,
        "spent {total} of {}",
        constraints.total_budget
    );
    if constraints.spend_entire_budget {
        assert!((total - constraints.total_budget).abs() <= tol);
    }

    for channel in channels {
        let spend = allocation[&channel.id];
        assert!(spend >= 0.0, "{} has negative spend {spend}", channel.id);
        if let Some(min) = channel.min_spend {
            assert!(spend >= min - tol, "{} below minSpend", channel.id);
        }
        if let Some(max) = channel.max_spend {
            assert!(spend <= max + tol, "{} above maxSpend", channel.id);
        }
        let revenue = spend * channel.roi;
        let revenue_tol = tol * channel.roi.max(1.0);
        if let Some(min) = channel.min_revenue {
            assert!(revenue >= min - revenue_tol, "{} below minRevenue", channel.id);
        }
        if let Some(max) = channel.max_revenue {
            assert!(revenue <= max + revenue_tol, "{} above maxRevenue", channel.id);
        }
    }

    if let Some(required) = constraints.min_channels_used {
        assert!(
            result.channels_used >= required,
            "{} channels used, {required} required",
            result.channels_used
        );
    }
}
