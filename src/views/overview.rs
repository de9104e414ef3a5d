//! Organization overview dashboard.
//!
//! Every chart here is backed by the same `overview-metrics` resource, so
//! each chart form POSTs a `{title, value}` metric whose title routes it
//! back into that chart on the next fetch.

use serde_json::json;

use super::{kpi_card, KPI_FIELDS};
use crate::aggregate::overview::{
    self, ACTIVITY, CONVERSION_RATE, DEAL_STATUS, MONTHLY_GROWTH, PERFORMERS, REVENUE,
    TOTAL_REVENUE,
};
use crate::aggregate::{Aggregate, AggregationContext};
use crate::client::Resource;
use crate::numeric::parse_input;
use crate::panel::forms::{FormDraft, StoreEdit, Submission};
use crate::panel::PanelView;
use crate::types::{KpiValue, OverviewMetric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverviewForm {
    DealStatus,
    Activity,
    Performer,
    Revenue,
    /// Sets the three sales summary cards at once.
    SalesMetrics,
    Kpi,
}

pub struct OverviewView;

fn metric(title: &str, value: &str) -> serde_json::Value {
    json!({ "title": title.trim(), "value": value.trim() })
}

/// Chart form: bump the chart locally and POST the titled metric.
fn chart_entry(
    draft: &FormDraft,
    series: &'static str,
    key_field: &str,
    value_field: &str,
    failure_message: &'static str,
) -> Submission {
    let key = draft.get(key_field);
    let value = draft.get(value_field);
    Submission::remote(
        vec![StoreEdit::bump(series, key.trim(), parse_input(value))],
        vec![metric(key, value)],
        failure_message,
    )
}

impl PanelView for OverviewView {
    type Record = OverviewMetric;
    type Form = OverviewForm;

    const RESOURCE: Resource = Resource::OverviewMetrics;
    const TITLE: &'static str = "Organization Overview";
    const LOAD_ERROR: &'static str = "Failed to load overview metrics";

    fn forms() -> &'static [OverviewForm] {
        &[
            OverviewForm::DealStatus,
            OverviewForm::Activity,
            OverviewForm::Performer,
            OverviewForm::Revenue,
            OverviewForm::SalesMetrics,
            OverviewForm::Kpi,
        ]
    }

    fn required_fields(form: OverviewForm) -> &'static [&'static str] {
        match form {
            OverviewForm::DealStatus | OverviewForm::Activity => &["name", "value"],
            OverviewForm::Performer => &["name", "deals", "revenue"],
            OverviewForm::Revenue => &["month", "revenue"],
            OverviewForm::SalesMetrics => &["totalRevenue", "monthlyGrowth", "conversionRate"],
            OverviewForm::Kpi => KPI_FIELDS,
        }
    }

    fn aggregate(records: &[OverviewMetric], ctx: &AggregationContext) -> Aggregate {
        overview::aggregate(records, ctx)
    }

    fn plan(form: OverviewForm, draft: &FormDraft) -> Submission {
        match form {
            OverviewForm::DealStatus => {
                chart_entry(draft, DEAL_STATUS, "name", "value", "Failed to add deal status")
            }
            OverviewForm::Activity => {
                chart_entry(draft, ACTIVITY, "name", "value", "Failed to add activity")
            }
            OverviewForm::Revenue => {
                chart_entry(draft, REVENUE, "month", "revenue", "Failed to add revenue data")
            }
            OverviewForm::Performer => {
                let name = draft.get("name");
                let revenue = draft.get("revenue");
                Submission::remote(
                    vec![StoreEdit::Bump {
                        series: PERFORMERS,
                        key: name.trim().to_string(),
                        delta: parse_input(revenue),
                        secondary: Some(parse_input(draft.get("deals"))),
                    }],
                    vec![metric(name, revenue)],
                    "Failed to add performer",
                )
            }
            OverviewForm::SalesMetrics => {
                let fields = [
                    (TOTAL_REVENUE, "totalRevenue"),
                    (MONTHLY_GROWTH, "monthlyGrowth"),
                    (CONVERSION_RATE, "conversionRate"),
                ];
                let edits = fields
                    .iter()
                    .map(|(title, field)| StoreEdit::SetKpi {
                        title: title.to_string(),
                        value: KpiValue::Number(parse_input(draft.get(field))),
                    })
                    .collect();
                let bodies = fields
                    .iter()
                    .map(|(title, field)| metric(title, draft.get(field)))
                    .collect();
                Submission::remote(edits, bodies, "Failed to set metrics")
            }
            OverviewForm::Kpi => kpi_card(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(form: OverviewForm, fields: &[(&str, &str)]) -> FormDraft {
        let mut draft = FormDraft::new(OverviewView::required_fields(form));
        for (k, v) in fields {
            draft.set(k, *v);
        }
        draft
    }

    #[test]
    fn test_chart_forms_post_title_value_metrics() {
        let plan = OverviewView::plan(
            OverviewForm::DealStatus,
            &draft(OverviewForm::DealStatus, &[("name", "Open Deals"), ("value", "12")]),
        );
        assert_eq!(plan.remote, vec![json!({"title": "Open Deals", "value": "12"})]);
        assert_eq!(plan.edits, vec![StoreEdit::bump(DEAL_STATUS, "Open Deals", 12.0)]);
        assert_eq!(plan.failure_message, "Failed to add deal status");
    }

    #[test]
    fn test_performer_keeps_deals_as_second_measure() {
        let plan = OverviewView::plan(
            OverviewForm::Performer,
            &draft(
                OverviewForm::Performer,
                &[("name", "Top Performer Kim"), ("deals", "8"), ("revenue", "42000")],
            ),
        );
        assert_eq!(plan.remote, vec![json!({"title": "Top Performer Kim", "value": "42000"})]);
        assert_eq!(
            plan.edits,
            vec![StoreEdit::Bump {
                series: PERFORMERS,
                key: "Top Performer Kim".into(),
                delta: 42000.0,
                secondary: Some(8.0),
            }]
        );
    }

    #[test]
    fn test_sales_metrics_post_three_records() {
        let plan = OverviewView::plan(
            OverviewForm::SalesMetrics,
            &draft(
                OverviewForm::SalesMetrics,
                &[("totalRevenue", "120000"), ("monthlyGrowth", "4.5"), ("conversionRate", "12")],
            ),
        );
        assert_eq!(
            plan.remote,
            vec![
                json!({"title": "Total Revenue", "value": "120000"}),
                json!({"title": "Monthly Growth", "value": "4.5"}),
                json!({"title": "Conversion Rate", "value": "12"}),
            ]
        );
        assert_eq!(plan.edits.len(), 3);
        assert_eq!(
            plan.edits[1],
            StoreEdit::SetKpi {
                title: MONTHLY_GROWTH.into(),
                value: KpiValue::Number(4.5),
            }
        );
        assert_eq!(plan.failure_message, "Failed to set metrics");
    }
}
