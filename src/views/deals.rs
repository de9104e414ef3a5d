//! Deal insights dashboard.

use serde_json::json;

use super::{bump, kpi_card, whole, KPI_FIELDS};
use crate::aggregate::deals::{self, MONTHLY, REVENUE, STAGES};
use crate::aggregate::{Aggregate, AggregationContext};
use crate::client::Resource;
use crate::panel::forms::{FormDraft, StoreEdit, Submission};
use crate::panel::PanelView;
use crate::types::DealInsight;

/// Estimated pipeline value per deal when a stage is added by hand.
const VALUE_PER_DEAL: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DealForm {
    /// Creates a `deal-insights` record.
    Stage,
    Month,
    Revenue,
    Kpi,
}

pub struct DealsView;

impl PanelView for DealsView {
    type Record = DealInsight;
    type Form = DealForm;

    const RESOURCE: Resource = Resource::DealInsights;
    const TITLE: &'static str = "Deal Insights";
    const LOAD_ERROR: &'static str = "Failed to load deal insights";

    fn forms() -> &'static [DealForm] {
        &[DealForm::Stage, DealForm::Month, DealForm::Revenue, DealForm::Kpi]
    }

    fn required_fields(form: DealForm) -> &'static [&'static str] {
        match form {
            DealForm::Stage => &["stage", "count"],
            DealForm::Month => &["month", "deals"],
            DealForm::Revenue => &["name", "value"],
            DealForm::Kpi => KPI_FIELDS,
        }
    }

    fn aggregate(records: &[DealInsight], ctx: &AggregationContext) -> Aggregate {
        deals::aggregate(records, ctx)
    }

    fn plan(form: DealForm, draft: &FormDraft) -> Submission {
        match form {
            DealForm::Stage => {
                let count = whole(draft, "count");
                Submission::remote(
                    vec![StoreEdit::bump(STAGES, draft.get("stage").trim(), count as f64)],
                    vec![json!({
                        "stage": draft.get("stage").trim(),
                        "count": count,
                        "totalValue": count.saturating_mul(VALUE_PER_DEAL),
                    })],
                    "Failed to add deal stage",
                )
            }
            DealForm::Month => Submission::local(vec![bump(draft, MONTHLY, "month", "deals")]),
            DealForm::Revenue => Submission::local(vec![bump(draft, REVENUE, "name", "value")]),
            DealForm::Kpi => kpi_card(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(form: DealForm, fields: &[(&str, &str)]) -> FormDraft {
        let mut draft = FormDraft::new(DealsView::required_fields(form));
        for (k, v) in fields {
            draft.set(k, *v);
        }
        draft
    }

    #[test]
    fn test_stage_posts_estimated_value() {
        let plan = DealsView::plan(DealForm::Stage, &draft(DealForm::Stage, &[("stage", "Proposal"), ("count", "4")]));
        assert_eq!(plan.failure_message, "Failed to add deal stage");
        assert_eq!(
            plan.remote,
            vec![json!({"stage": "Proposal", "count": 4, "totalValue": 40000})]
        );
        assert_eq!(plan.edits, vec![StoreEdit::bump(STAGES, "Proposal", 4.0)]);
    }

    #[test]
    fn test_huge_stage_count_saturates_value() {
        let plan = DealsView::plan(DealForm::Stage, &draft(DealForm::Stage, &[("stage", "Lead"), ("count", "1e15")]));
        assert_eq!(plan.remote[0]["count"], 1_000_000_000_000_000_i64);
        assert_eq!(plan.remote[0]["totalValue"], i64::MAX);

        let plan = DealsView::plan(DealForm::Stage, &draft(DealForm::Stage, &[("stage", "Lead"), ("count", "-1e30")]));
        assert_eq!(plan.remote[0]["totalValue"], i64::MIN);
    }

    #[test]
    fn test_month_and_revenue_stay_local() {
        let month = DealsView::plan(DealForm::Month, &draft(DealForm::Month, &[("month", "Oct"), ("deals", "3")]));
        assert!(!month.is_remote());
        assert_eq!(month.edits, vec![StoreEdit::bump(MONTHLY, "Oct", 3.0)]);

        let revenue = DealsView::plan(DealForm::Revenue, &draft(DealForm::Revenue, &[("name", "Won"), ("value", "2500.5")]));
        assert!(!revenue.is_remote());
        assert_eq!(revenue.edits, vec![StoreEdit::bump(REVENUE, "Won", 2500.5)]);
    }
}
