//! Wire records, pages, and chart-ready shapes shared by every panel.

use serde::{Deserialize, Serialize};

use crate::numeric::Numeric;

// =============================================================================
// Backend records
// =============================================================================

/// One row of `activity-stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStat {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub day: String,
    #[serde(default, deserialize_with = "crate::numeric::lenient_int")]
    pub calls: i64,
    #[serde(default, deserialize_with = "crate::numeric::lenient_int")]
    pub emails: i64,
    #[serde(default, deserialize_with = "crate::numeric::lenient_int")]
    pub meetings: i64,
}

impl ActivityStat {
    pub fn total(&self) -> i64 {
        self.calls + self.emails + self.meetings
    }
}

/// One row of `deal-insights`. `totalValue` is a BigDecimal server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInsight {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub stage: String,
    #[serde(default, deserialize_with = "crate::numeric::lenient_int")]
    pub count: i64,
    #[serde(default)]
    pub total_value: Numeric,
}

/// One row of `lead-analytics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAnalytics {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub source: String,
    #[serde(default, deserialize_with = "crate::numeric::lenient_int")]
    pub count: i64,
    #[serde(default)]
    pub conversion_rate: Numeric,
    /// Not persisted by every backend; drives the per-day trend when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// One row of `overview-metrics`: a titled free-text value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewMetric {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: Numeric,
}

/// A page of records as returned by `GET /<resource>/paged`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_pages: u32) -> Self {
        Self {
            content,
            total_pages: Some(total_pages),
            total_elements: None,
            number: None,
            size: None,
        }
    }

    /// Page count with the dashboards' fallback: absent or 0 reads as 1.
    pub fn page_count(&self) -> u32 {
        match self.total_pages {
            Some(n) if n > 0 => n,
            _ => 1,
        }
    }
}

// =============================================================================
// Chart-ready shapes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Unique labels, collisions summed.
    Categorical,
    /// Every slot of a fixed range, in canonical order.
    Sequential,
}

/// Where a series entry's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryOrigin {
    /// Produced by the last full fetch.
    Server,
    /// Added through a form that never talks to the backend.
    Local,
    /// Optimistic edit whose POST has not resolved yet.
    Pending,
    /// Optimistic edit whose POST succeeded.
    Confirmed,
    /// Optimistic edit whose POST failed. Kept until the next full fetch.
    Unsynced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub key: String,
    pub value: f64,
    /// Second measure for two-value charts (performer deals).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<f64>,
    pub origin: EntryOrigin,
}

impl SeriesPoint {
    pub fn server(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
            secondary: None,
            origin: EntryOrigin::Server,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub kind: SeriesKind,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn categorical(points: Vec<SeriesPoint>) -> Self {
        Self {
            kind: SeriesKind::Categorical,
            points,
        }
    }

    pub fn sequential(points: Vec<SeriesPoint>) -> Self {
        Self {
            kind: SeriesKind::Sequential,
            points,
        }
    }

    pub fn empty(kind: SeriesKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SeriesPoint> {
        self.points.iter().find(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.key.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Number(f64),
    Text(String),
}

impl From<f64> for KpiValue {
    fn from(v: f64) -> Self {
        KpiValue::Number(v)
    }
}

impl From<i64> for KpiValue {
    fn from(v: i64) -> Self {
        KpiValue::Number(v as f64)
    }
}

impl From<usize> for KpiValue {
    fn from(v: usize) -> Self {
        KpiValue::Number(v as f64)
    }
}

impl From<String> for KpiValue {
    fn from(v: String) -> Self {
        KpiValue::Text(v)
    }
}

impl From<&str> for KpiValue {
    fn from(v: &str) -> Self {
        KpiValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub title: String,
    pub value: KpiValue,
}

impl Kpi {
    pub fn new(title: impl Into<String>, value: impl Into<KpiValue>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}
