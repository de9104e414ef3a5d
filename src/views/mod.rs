//! The four dashboards as [`PanelView`](crate::panel::PanelView) implementations.
//!
//! Each view pairs a backend resource with its aggregation rules and the
//! forms shown under its charts. Forms that only reshape local charts never
//! POST; the ones that create backend records POST first-class records.

pub mod activity;
pub mod deals;
pub mod leads;
pub mod overview;

use crate::numeric::parse_input;
use crate::panel::forms::{FormDraft, StoreEdit, Submission};
use crate::panel::Panel;
use crate::types::Kpi;

pub use activity::{ActivityForm, ActivityView};
pub use deals::{DealForm, DealsView};
pub use leads::{LeadForm, LeadsView};
pub use overview::{OverviewForm, OverviewView};

pub type ActivityPanel = Panel<ActivityView>;
pub type DealsPanel = Panel<DealsView>;
pub type LeadsPanel = Panel<LeadsView>;
pub type OverviewPanel = Panel<OverviewView>;

/// Fields of the ad-hoc KPI card form every dashboard carries.
pub(crate) const KPI_FIELDS: &[&str] = &["title", "value"];

/// KPI card form: appended as typed, never posted.
pub(crate) fn kpi_card(draft: &FormDraft) -> Submission {
    Submission::local(vec![StoreEdit::PushKpi(Kpi::new(
        draft.get("title").trim(),
        draft.get("value").trim(),
    ))])
}

/// Append-or-increment `series` by the draft's `key_field` and `value_field`.
pub(crate) fn bump(
    draft: &FormDraft,
    series: &'static str,
    key_field: &str,
    value_field: &str,
) -> StoreEdit {
    StoreEdit::bump(
        series,
        draft.get(key_field).trim(),
        parse_input(draft.get(value_field)),
    )
}

/// Whole-number form input, as sent to integer backend columns.
pub(crate) fn whole(draft: &FormDraft, field: &str) -> i64 {
    parse_input(draft.get(field)).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KpiValue;

    #[test]
    fn test_kpi_card_keeps_value_as_text() {
        let mut draft = FormDraft::new(KPI_FIELDS);
        draft.set("title", " Win Rate ");
        draft.set("value", "31%");
        let submission = kpi_card(&draft);
        assert!(!submission.is_remote());
        assert_eq!(
            submission.edits,
            vec![StoreEdit::PushKpi(Kpi {
                title: "Win Rate".into(),
                value: KpiValue::Text("31%".into()),
            })]
        );
    }

    #[test]
    fn test_bump_coerces_bad_numbers_to_zero() {
        let mut draft = FormDraft::new(&["name", "value"]);
        draft.set("name", "Referral");
        draft.set("value", "lots");
        assert_eq!(bump(&draft, "sources", "name", "value"), StoreEdit::bump("sources", "Referral", 0.0));
    }

    #[test]
    fn test_whole_truncates() {
        let mut draft = FormDraft::new(&["count"]);
        draft.set("count", "3.9");
        assert_eq!(whole(&draft, "count"), 3);
    }
}
