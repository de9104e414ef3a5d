//! Deal insights: pipeline stages with deal counts and value.

use std::collections::HashMap;

use super::{count_series, group_sums, month_label, share_series, zero_fill, Aggregate, AggregationContext, MONTHS};
use crate::numeric::{format_currency, rounded_average};
use crate::types::{DealInsight, Kpi};

pub const STAGES: &str = "stages";
pub const REVENUE: &str = "revenue";
pub const MONTHLY: &str = "monthly";

const COUNT: usize = 0;
const VALUE: usize = 1;

pub fn aggregate(records: &[DealInsight], ctx: &AggregationContext) -> Aggregate {
    let stages = group_sums(
        records,
        |r| r.stage.as_str(),
        |r| [r.count as f64, r.total_value.or_zero()],
    );

    let stage_series = count_series(&stages, COUNT);
    let revenue_series = share_series(&stages, VALUE);

    let total_deals: f64 = stage_series.points.iter().map(|p| p.value).sum();
    let total_value: f64 = revenue_series.points.iter().map(|p| p.value).sum();
    let avg_deal_value = rounded_average(total_value, total_deals);

    // The backend has no close dates, so the whole page lands in the current month.
    let mut monthly: HashMap<String, f64> = HashMap::new();
    monthly.insert(month_label(ctx.today).to_string(), total_deals);

    Aggregate::default()
        .with_kpi(Kpi::new("Total Deals", total_deals))
        .with_kpi(Kpi::new("Total Value", format_currency(total_value)))
        .with_kpi(Kpi::new("Avg Deal Value", format_currency(avg_deal_value)))
        .with_kpi(Kpi::new("Active Stages", stage_series.len()))
        .with_series(STAGES, stage_series)
        .with_series(REVENUE, revenue_series)
        .with_series(MONTHLY, zero_fill(&MONTHS, &monthly))
}
