//! Local mutation store for one panel.
//!
//! Holds what the presentation layer renders. A full fetch replaces
//! everything; form submits edit entries in place or append them, tagged
//! with an [`EntryOrigin`] so optimistic edits stay distinguishable from
//! server truth until the next replace.

use std::collections::BTreeMap;

use crate::aggregate::Aggregate;
use crate::types::{EntryOrigin, Kpi, KpiValue, Series, SeriesKind, SeriesPoint};

/// Result of an `append_or_increment`: where the entry ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Incremented(usize),
    Appended(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricStore {
    series: BTreeMap<String, Series>,
    kpis: Vec<Kpi>,
    /// Bumped by every `replace_all`.
    generation: u64,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all prior content and take the aggregate's.
    pub fn replace_all(&mut self, aggregate: Aggregate) {
        self.series = aggregate.series;
        self.kpis = aggregate.kpis;
        self.generation += 1;
    }

    /// Number of full replaces so far. Edits made before a replace are gone after it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Add `delta` to the entry keyed `key`, or append a new entry at the end.
    ///
    /// A series that does not exist yet is created as categorical.
    pub fn append_or_increment(
        &mut self,
        series: &str,
        key: &str,
        delta: f64,
        origin: EntryOrigin,
    ) -> Applied {
        self.append_or_increment_with(series, key, delta, None, origin)
    }

    /// Same as [`append_or_increment`](Self::append_or_increment) with a second measure.
    pub fn append_or_increment_with(
        &mut self,
        series: &str,
        key: &str,
        delta: f64,
        secondary: Option<f64>,
        origin: EntryOrigin,
    ) -> Applied {
        let target = self
            .series
            .entry(series.to_string())
            .or_insert_with(|| Series::empty(SeriesKind::Categorical));

        if let Some(i) = target.points.iter().position(|p| p.key == key) {
            let point = &mut target.points[i];
            point.value += delta;
            if let Some(extra) = secondary {
                point.secondary = Some(point.secondary.unwrap_or(0.0) + extra);
            }
            point.origin = origin;
            return Applied::Incremented(i);
        }

        target.points.push(SeriesPoint {
            key: key.to_string(),
            value: delta,
            secondary,
            origin,
        });
        Applied::Appended(target.points.len() - 1)
    }

    /// Re-tag an entry once its POST resolves. No-op if a replace removed it.
    pub fn mark(&mut self, series: &str, key: &str, origin: EntryOrigin) -> bool {
        match self
            .series
            .get_mut(series)
            .and_then(|s| s.points.iter_mut().find(|p| p.key == key))
        {
            Some(point) => {
                point.origin = origin;
                true
            }
            None => false,
        }
    }

    /// Append a KPI card. No dedup.
    pub fn push_kpi(&mut self, kpi: Kpi) {
        self.kpis.push(kpi);
    }

    /// Replace the first KPI with this title, or append it.
    pub fn set_kpi(&mut self, title: &str, value: KpiValue) {
        match self.kpis.iter_mut().find(|k| k.title == title) {
            Some(existing) => existing.value = value,
            None => self.kpis.push(Kpi::new(title, value)),
        }
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn all_series(&self) -> &BTreeMap<String, Series> {
        &self.series
    }

    pub fn kpis(&self) -> &[Kpi] {
        &self.kpis
    }

    /// Entries whose value is not yet backed by the server.
    pub fn divergent_entries(&self) -> usize {
        self.series
            .values()
            .flat_map(|s| s.points.iter())
            .filter(|p| matches!(p.origin, EntryOrigin::Pending | EntryOrigin::Unsynced))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(series: &str, points: &[(&str, f64)]) -> MetricStore {
        let agg = Aggregate::default().with_series(
            series,
            Series::categorical(
                points
                    .iter()
                    .map(|(k, v)| SeriesPoint::server(*k, *v))
                    .collect(),
            ),
        );
        let mut store = MetricStore::new();
        store.replace_all(agg);
        store
    }

    #[test]
    fn test_increment_existing_key_in_place() {
        let mut store = store_with("sources", &[("Website", 10.0), ("Event", 4.0)]);
        let applied = store.append_or_increment("sources", "Website", 5.0, EntryOrigin::Pending);

        assert_eq!(applied, Applied::Incremented(0));
        let series = store.series("sources").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].value, 15.0);
        assert_eq!(series.points[0].origin, EntryOrigin::Pending);
        assert_eq!(series.points[1].origin, EntryOrigin::Server);
    }

    #[test]
    fn test_new_key_appends_at_end() {
        let mut store = store_with("sources", &[("Website", 10.0), ("Event", 4.0)]);
        let applied = store.append_or_increment("sources", "Referral", 2.0, EntryOrigin::Local);

        assert_eq!(applied, Applied::Appended(2));
        assert_eq!(
            store.series("sources").unwrap().keys(),
            vec!["Website", "Event", "Referral"]
        );
    }

    #[test]
    fn test_missing_series_is_created() {
        let mut store = MetricStore::new();
        store.append_or_increment("users", "ana", 3.0, EntryOrigin::Local);
        let users = store.series("users").unwrap();
        assert_eq!(users.kind, SeriesKind::Categorical);
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_secondary_accumulates() {
        let mut store = MetricStore::new();
        store.append_or_increment_with("performers", "Kim", 100.0, Some(2.0), EntryOrigin::Pending);
        store.append_or_increment_with("performers", "Kim", 50.0, Some(3.0), EntryOrigin::Pending);
        let kim = store.series("performers").unwrap().get("Kim").unwrap().clone();
        assert_eq!(kim.value, 150.0);
        assert_eq!(kim.secondary, Some(5.0));
    }

    #[test]
    fn test_replace_all_discards_local_edits() {
        let mut store = store_with("stages", &[("Lead", 5.0)]);
        store.append_or_increment("stages", "Won", 1.0, EntryOrigin::Unsynced);
        store.push_kpi(Kpi::new("Custom", "x"));
        assert_eq!(store.divergent_entries(), 1);

        store.replace_all(Aggregate::default().with_series(
            "stages",
            Series::categorical(vec![SeriesPoint::server("Lead", 6.0)]),
        ));
        assert_eq!(store.series("stages").unwrap().keys(), vec!["Lead"]);
        assert!(store.kpis().is_empty());
        assert_eq!(store.divergent_entries(), 0);
    }

    #[test]
    fn test_mark_after_replace_is_noop() {
        let mut store = store_with("stages", &[("Lead", 5.0)]);
        assert!(store.mark("stages", "Lead", EntryOrigin::Confirmed));
        assert!(!store.mark("stages", "Gone", EntryOrigin::Confirmed));
        assert!(!store.mark("missing", "Lead", EntryOrigin::Confirmed));
    }

    #[test]
    fn test_kpis_append_without_dedup_and_set_replaces() {
        let mut store = MetricStore::new();
        store.push_kpi(Kpi::new("NPS", 40_i64));
        store.push_kpi(Kpi::new("NPS", 41_i64));
        assert_eq!(store.kpis().len(), 2);

        store.set_kpi("NPS", KpiValue::Number(50.0));
        assert_eq!(store.kpis()[0].value, KpiValue::Number(50.0));
        assert_eq!(store.kpis()[1].value, KpiValue::Number(41.0));

        store.set_kpi("Churn", KpiValue::Text("2%".into()));
        assert_eq!(store.kpis().len(), 3);
    }

    #[test]
    fn test_replace_all_bumps_generation() {
        let mut store = MetricStore::new();
        assert_eq!(store.generation(), 0);
        store.append_or_increment("stages", "Won", 1.0, EntryOrigin::Pending);
        assert_eq!(store.generation(), 0);
        store.replace_all(Aggregate::default());
        store.replace_all(Aggregate::default());
        assert_eq!(store.generation(), 2);
    }
}
