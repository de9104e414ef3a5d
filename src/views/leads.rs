//! Lead analytics dashboard.

use serde_json::json;

use super::{bump, kpi_card, whole, KPI_FIELDS};
use crate::aggregate::leads::{self, RECENT, SOURCES, STATUSES};
use crate::aggregate::{day_label, parse_date, Aggregate, AggregationContext};
use crate::client::Resource;
use crate::numeric::parse_input;
use crate::panel::forms::{FormDraft, StoreEdit, Submission};
use crate::panel::PanelView;
use crate::types::LeadAnalytics;

/// Conversion rate recorded for hand-added lead sources.
const DEFAULT_CONVERSION_RATE: f64 = 15.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeadForm {
    /// Creates a `lead-analytics` record.
    Source,
    Status,
    Recent,
    Kpi,
}

pub struct LeadsView;

impl PanelView for LeadsView {
    type Record = LeadAnalytics;
    type Form = LeadForm;

    const RESOURCE: Resource = Resource::LeadAnalytics;
    const TITLE: &'static str = "Lead Analytics";
    const LOAD_ERROR: &'static str = "Failed to load lead analytics";

    fn forms() -> &'static [LeadForm] {
        &[LeadForm::Source, LeadForm::Status, LeadForm::Recent, LeadForm::Kpi]
    }

    fn required_fields(form: LeadForm) -> &'static [&'static str] {
        match form {
            LeadForm::Source => &["name", "value"],
            LeadForm::Status => &["status", "count"],
            LeadForm::Recent => &["date", "leads"],
            LeadForm::Kpi => KPI_FIELDS,
        }
    }

    fn aggregate(records: &[LeadAnalytics], ctx: &AggregationContext) -> Aggregate {
        leads::aggregate(records, ctx)
    }

    fn plan(form: LeadForm, draft: &FormDraft) -> Submission {
        match form {
            LeadForm::Source => {
                let source = draft.get("name").trim();
                let count = whole(draft, "value");
                Submission::remote(
                    vec![StoreEdit::bump(SOURCES, source, count as f64)],
                    vec![json!({
                        "source": source,
                        "count": count,
                        "conversionRate": DEFAULT_CONVERSION_RATE,
                    })],
                    "Failed to add lead source",
                )
            }
            LeadForm::Status => Submission::local(vec![bump(draft, STATUSES, "status", "count")]),
            LeadForm::Recent => {
                // Dates land on the trend's own day slots when they parse.
                let raw = draft.get("date").trim();
                let key = parse_date(raw).map(day_label).unwrap_or_else(|| raw.to_string());
                Submission::local(vec![StoreEdit::bump(
                    RECENT,
                    key,
                    parse_input(draft.get("leads")),
                )])
            }
            LeadForm::Kpi => kpi_card(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(form: LeadForm, fields: &[(&str, &str)]) -> FormDraft {
        let mut draft = FormDraft::new(LeadsView::required_fields(form));
        for (k, v) in fields {
            draft.set(k, *v);
        }
        draft
    }

    #[test]
    fn test_source_posts_default_conversion_rate() {
        let plan = LeadsView::plan(LeadForm::Source, &draft(LeadForm::Source, &[("name", "Webinar"), ("value", "12")]));
        assert_eq!(
            plan.remote,
            vec![json!({"source": "Webinar", "count": 12, "conversionRate": 15.5})]
        );
        assert_eq!(plan.edits, vec![StoreEdit::bump(SOURCES, "Webinar", 12.0)]);
        assert_eq!(plan.failure_message, "Failed to add lead source");
    }

    #[test]
    fn test_recent_normalizes_iso_dates() {
        let plan = LeadsView::plan(LeadForm::Recent, &draft(LeadForm::Recent, &[("date", "2026-10-05"), ("leads", "4")]));
        assert_eq!(plan.edits, vec![StoreEdit::bump(RECENT, "10/5/2026", 4.0)]);

        let plan = LeadsView::plan(LeadForm::Recent, &draft(LeadForm::Recent, &[("date", "yesterday"), ("leads", "1")]));
        assert_eq!(plan.edits, vec![StoreEdit::bump(RECENT, "yesterday", 1.0)]);
    }
}
