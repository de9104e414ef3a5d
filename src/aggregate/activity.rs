//! Activity stats: daily call/email/meeting counts.

use std::collections::HashMap;

use chrono::{Datelike, Weekday};

use super::{count_series, group_sums, parse_date, share_series, zero_fill, Aggregate, AggregationContext, WEEKDAYS};
use crate::numeric::rounded_average;
use crate::types::{ActivityStat, Kpi, Series, SeriesKind};

pub const TRENDS: &str = "trends";
pub const WEEKDAY_TRENDS: &str = "weekdays";
pub const TYPES: &str = "types";
pub const USERS: &str = "users";

pub fn aggregate(records: &[ActivityStat], _ctx: &AggregationContext) -> Aggregate {
    let by_day = group_sums(records, |r| r.day.as_str(), |r| [r.total() as f64]);

    let total_calls: i64 = records.iter().map(|r| r.calls).sum();
    let total_emails: i64 = records.iter().map(|r| r.emails).sum();
    let total_meetings: i64 = records.iter().map(|r| r.meetings).sum();

    let type_groups = group_sums(
        &[
            ("Calls", total_calls),
            ("Emails", total_emails),
            ("Meetings", total_meetings),
        ],
        |t| t.0,
        |t| [t.1 as f64],
    );

    let mut weekday_totals: HashMap<String, f64> = HashMap::new();
    for record in records {
        if let Some(label) = weekday_label(&record.day) {
            *weekday_totals.entry(label.to_string()).or_insert(0.0) += record.total() as f64;
        }
    }

    let total_activities = total_calls + total_emails + total_meetings;
    let avg_per_day = rounded_average(total_activities as f64, records.len() as f64);

    Aggregate::default()
        .with_series(TRENDS, count_series(&by_day, 0))
        .with_series(WEEKDAY_TRENDS, zero_fill(&WEEKDAYS, &weekday_totals))
        .with_series(TYPES, share_series(&type_groups, 0))
        // Per-user counts are not in the backend; only the form fills this.
        .with_series(USERS, Series::empty(SeriesKind::Categorical))
        .with_kpi(Kpi::new("Total Activities", total_activities))
        .with_kpi(Kpi::new("Avg/Day", avg_per_day))
        .with_kpi(Kpi::new("Total Calls", total_calls))
        .with_kpi(Kpi::new("Total Emails", total_emails))
}

/// Weekday slot for a `day` value: a date, or a weekday name like "Tue"/"tuesday".
fn weekday_label(day: &str) -> Option<&'static str> {
    if let Some(date) = parse_date(day) {
        return Some(WEEKDAYS[date.weekday().num_days_from_monday() as usize]);
    }
    day.trim()
        .parse::<Weekday>()
        .ok()
        .map(|w| WEEKDAYS[w.num_days_from_monday() as usize])
}
