//! Lead analytics: lead counts and conversion rates by source.

use std::collections::HashMap;

use super::{count_series, day_label, group_sums, month_day_labels, parse_date, share_series, zero_fill, Aggregate, AggregationContext};
use crate::numeric::format_percent;
use crate::types::{Kpi, LeadAnalytics};

pub const SOURCES: &str = "sources";
pub const STATUSES: &str = "statuses";
pub const RECENT: &str = "recent";

pub fn aggregate(records: &[LeadAnalytics], ctx: &AggregationContext) -> Aggregate {
    let sources = group_sums(records, |r| r.source.as_str(), |r| [r.count as f64]);

    let total_leads: i64 = records.iter().map(|r| r.count).sum();
    let total_conversion: f64 = records.iter().map(|r| r.conversion_rate.or_zero()).sum();
    let avg_conversion = if records.is_empty() {
        0.0
    } else {
        total_conversion / records.len() as f64
    };

    // Per-day counts for the current month, keyed by the trend's own label format.
    let mut by_day: HashMap<String, f64> = HashMap::new();
    for record in records {
        let Some(date) = record.date.as_deref().and_then(parse_date) else {
            continue;
        };
        *by_day.entry(day_label(date)).or_insert(0.0) += record.count as f64;
    }

    Aggregate::default()
        .with_series(SOURCES, share_series(&sources, 0))
        .with_series(STATUSES, count_series(&sources, 0))
        .with_series(RECENT, zero_fill(&month_day_labels(ctx.today), &by_day))
        .with_kpi(Kpi::new("Total Leads", total_leads))
        .with_kpi(Kpi::new("Avg Conversion", format_percent(avg_conversion)))
        .with_kpi(Kpi::new("Total Conversion", format_percent(total_conversion)))
        .with_kpi(Kpi::new("Lead Sources", sources.len()))
}
