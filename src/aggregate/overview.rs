//! Organization overview: free-form titled metrics sorted into charts by title.

use super::{count_series, group_sums, share_series, Aggregate, AggregationContext, Group};
use crate::types::{Kpi, OverviewMetric};

pub const DEAL_STATUS: &str = "deal_status";
pub const ACTIVITY: &str = "activity";
pub const REVENUE: &str = "revenue";
pub const PERFORMERS: &str = "performers";

pub const TOTAL_REVENUE: &str = "Total Revenue";
pub const MONTHLY_GROWTH: &str = "Monthly Growth";
pub const CONVERSION_RATE: &str = "Conversion Rate";

/// Title substrings that route a metric into each chart. A title can match several.
const ROUTES: [(&str, [&str; 2]); 4] = [
    (DEAL_STATUS, ["Deal", "Status"]),
    (ACTIVITY, ["Activity", "Task"]),
    (REVENUE, ["Revenue", "Month"]),
    (PERFORMERS, ["Performer", "Sales"]),
];

pub fn aggregate(records: &[OverviewMetric], _ctx: &AggregationContext) -> Aggregate {
    let by_title = group_sums(records, |r| r.title.as_str(), |r| [r.value.or_zero()]);

    let mut agg = Aggregate::default();
    for (name, needles) in ROUTES {
        let routed: Vec<Group<1>> = by_title
            .iter()
            .filter(|g| needles.iter().any(|n| g.label.contains(n)))
            .cloned()
            .collect();
        let series = if name == DEAL_STATUS {
            share_series(&routed, 0)
        } else {
            count_series(&routed, 0)
        };
        agg = agg.with_series(name, series);
    }

    // The sales summary is all-or-nothing: first occurrence of each title.
    let first = |title: &str| records.iter().find(|r| r.title == title);
    if let (Some(revenue), Some(growth), Some(conversion)) =
        (first(TOTAL_REVENUE), first(MONTHLY_GROWTH), first(CONVERSION_RATE))
    {
        agg = agg
            .with_kpi(Kpi::new(TOTAL_REVENUE, revenue.value.or_zero()))
            .with_kpi(Kpi::new(MONTHLY_GROWTH, growth.value.or_zero()))
            .with_kpi(Kpi::new(CONVERSION_RATE, conversion.value.or_zero()));
    }

    agg
}
