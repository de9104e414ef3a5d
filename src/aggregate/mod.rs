//! Pure aggregation from a page of records to chart-ready series and KPIs.
//!
//! Each view has its own rule set (`activity`, `deals`, `leads`,
//! `overview`); the grouping, filtering, and zero-fill policies they share
//! live here.

pub mod activity;
pub mod deals;
pub mod leads;
pub mod overview;

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::types::{Kpi, Series, SeriesPoint};

/// Calendar month labels in canonical order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Weekday labels in canonical order (ISO week, Monday first).
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Inputs an aggregation needs besides the records themselves.
#[derive(Debug, Clone, Copy)]
pub struct AggregationContext {
    /// Anchors the current month for month/day ranges.
    pub today: NaiveDate,
}

impl AggregationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn now() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// Output of one aggregation pass: named series plus KPI cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub series: BTreeMap<String, Series>,
    pub kpis: Vec<Kpi>,
}

impl Aggregate {
    pub fn with_series(mut self, name: &str, series: Series) -> Self {
        self.series.insert(name.to_string(), series);
        self
    }

    pub fn with_kpi(mut self, kpi: Kpi) -> Self {
        self.kpis.push(kpi);
        self
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn kpi(&self, title: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.title == title)
    }
}

/// A label with its summed measures, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<const N: usize> {
    pub label: String,
    pub totals: [f64; N],
}

/// Group records by label and sum `N` measures per label.
///
/// Repeated labels accumulate; the first occurrence fixes the position.
pub fn group_sums<T, const N: usize>(
    records: &[T],
    label: impl Fn(&T) -> &str,
    measures: impl Fn(&T) -> [f64; N],
) -> Vec<Group<N>> {
    let mut groups: Vec<Group<N>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = label(record);
        let values = measures(record);
        match index.get(key) {
            Some(&i) => {
                for (total, v) in groups[i].totals.iter_mut().zip(values) {
                    *total += v;
                }
            }
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push(Group {
                    label: key.to_string(),
                    totals: values,
                });
            }
        }
    }

    groups
}

/// Count-style series: every group, zero totals included.
pub fn count_series<const N: usize>(groups: &[Group<N>], measure: usize) -> Series {
    Series::categorical(
        groups
            .iter()
            .map(|g| SeriesPoint::server(g.label.clone(), g.totals[measure]))
            .collect(),
    )
}

/// Share-style series (pie inputs): groups with a total ≤ 0 are dropped.
pub fn share_series<const N: usize>(groups: &[Group<N>], measure: usize) -> Series {
    Series::categorical(
        groups
            .iter()
            .filter(|g| g.totals[measure] > 0.0)
            .map(|g| SeriesPoint::server(g.label.clone(), g.totals[measure]))
            .collect(),
    )
}

/// Walk a canonical range and look each slot up in `values`; missing → 0.
pub fn zero_fill<S: AsRef<str>>(range: &[S], values: &HashMap<String, f64>) -> Series {
    Series::sequential(
        range
            .iter()
            .map(|slot| {
                let slot = slot.as_ref();
                SeriesPoint::server(slot, values.get(slot).copied().unwrap_or(0.0))
            })
            .collect(),
    )
}

pub fn month_label(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// `M/D/YYYY` label used by the per-day trend.
pub fn day_label(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Every day of `today`'s month, labelled, in ascending order.
pub fn month_day_labels(today: NaiveDate) -> Vec<String> {
    (1..=days_in_month(today))
        .filter_map(|day| NaiveDate::from_ymd_opt(today.year(), today.month(), day))
        .map(day_label)
        .collect()
}

/// Read a date written as `YYYY-MM-DD` or `M/D/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}
