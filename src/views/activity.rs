//! Activity stats dashboard.

use serde_json::json;

use super::{bump, kpi_card, KPI_FIELDS};
use crate::aggregate::activity::{self, TRENDS, TYPES, USERS};
use crate::aggregate::{Aggregate, AggregationContext};
use crate::client::Resource;
use crate::numeric::parse_input;
use crate::panel::forms::{FormDraft, StoreEdit, Submission};
use crate::panel::PanelView;
use crate::types::ActivityStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivityForm {
    /// Creates an `activity-stats` record.
    Trend,
    Type,
    User,
    Kpi,
}

pub struct ActivityView;

/// Split a day's activity total into calls, emails and meetings (40/40/20, floored).
pub fn split_activities(total: f64) -> (i64, i64, i64) {
    (
        (total * 0.4).floor() as i64,
        (total * 0.4).floor() as i64,
        (total * 0.2).floor() as i64,
    )
}

impl PanelView for ActivityView {
    type Record = ActivityStat;
    type Form = ActivityForm;

    const RESOURCE: Resource = Resource::ActivityStats;
    const TITLE: &'static str = "Activity Stats";
    const LOAD_ERROR: &'static str = "Failed to load activity statistics";

    fn forms() -> &'static [ActivityForm] {
        &[
            ActivityForm::Trend,
            ActivityForm::Type,
            ActivityForm::User,
            ActivityForm::Kpi,
        ]
    }

    fn required_fields(form: ActivityForm) -> &'static [&'static str] {
        match form {
            ActivityForm::Trend => &["day", "activities"],
            ActivityForm::Type => &["name", "value"],
            ActivityForm::User => &["user", "count"],
            ActivityForm::Kpi => KPI_FIELDS,
        }
    }

    fn aggregate(records: &[ActivityStat], ctx: &AggregationContext) -> Aggregate {
        activity::aggregate(records, ctx)
    }

    fn plan(form: ActivityForm, draft: &FormDraft) -> Submission {
        match form {
            ActivityForm::Trend => {
                let day = draft.get("day").trim();
                let activities = parse_input(draft.get("activities"));
                let (calls, emails, meetings) = split_activities(activities);
                Submission::remote(
                    vec![StoreEdit::bump(TRENDS, day, activities)],
                    vec![json!({
                        "day": day,
                        "calls": calls,
                        "emails": emails,
                        "meetings": meetings,
                    })],
                    "Failed to add activity trend",
                )
            }
            ActivityForm::Type => Submission::local(vec![bump(draft, TYPES, "name", "value")]),
            ActivityForm::User => Submission::local(vec![bump(draft, USERS, "user", "count")]),
            ActivityForm::Kpi => kpi_card(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_floors_each_share() {
        assert_eq!(split_activities(10.0), (4, 4, 2));
        // 40/40/20 of 7 floors to 2/2/1; the remainder is not sent.
        assert_eq!(split_activities(7.0), (2, 2, 1));
        assert_eq!(split_activities(0.0), (0, 0, 0));
    }

    #[test]
    fn test_trend_posts_split_record_and_bumps_full_total() {
        let mut draft = FormDraft::new(ActivityView::required_fields(ActivityForm::Trend));
        draft.set("day", "Tue");
        draft.set("activities", "7");
        let plan = ActivityView::plan(ActivityForm::Trend, &draft);

        assert_eq!(plan.failure_message, "Failed to add activity trend");
        assert_eq!(
            plan.remote,
            vec![json!({"day": "Tue", "calls": 2, "emails": 2, "meetings": 1})]
        );
        assert_eq!(plan.edits, vec![StoreEdit::bump(TRENDS, "Tue", 7.0)]);
    }

    #[test]
    fn test_user_form_fills_users_series() {
        let mut draft = FormDraft::new(ActivityView::required_fields(ActivityForm::User));
        draft.set("user", "ana");
        draft.set("count", "12");
        let plan = ActivityView::plan(ActivityForm::User, &draft);
        assert!(!plan.is_remote());
        assert_eq!(plan.edits, vec![StoreEdit::bump(USERS, "ana", 12.0)]);
    }
}
