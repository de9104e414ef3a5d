//! Panel controller: one dashboard view's fetch → aggregate → store loop.
//!
//! A [`Panel`] is a plain state machine driven through `&mut self`:
//!
//! ```text
//! Idle ──mount──▶ Loading ──ok──▶ Ready
//!                   ▲     └─err─▶ Failed
//!                   └── page / size change from Ready or Failed
//! ```
//!
//! Every fetch is tagged with a sequence number; a response whose tag is not
//! the latest is dropped, so a slow early request can never overwrite a newer
//! page. Form submits edit the store before their POSTs resolve and are
//! re-tagged afterwards; a failed POST leaves the edit in place as
//! `Unsynced` until the next full fetch.
//!
//! [`actor`] wraps a panel in a single tokio task for callers that need
//! concurrent commands.

pub mod actor;
pub mod forms;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::aggregate::{Aggregate, AggregationContext};
use crate::client::{MetricsBackend, Resource};
use crate::error::{MetricsResult, PanelError};
use crate::store::MetricStore;
use crate::types::{EntryOrigin, Kpi, Page, Series};
use forms::{FormDraft, StoreEdit, Submission};

/// Binds a backend resource to its aggregation rules and forms.
pub trait PanelView: Send + 'static {
    type Record: DeserializeOwned + Send;
    type Form: Copy + Ord + Debug + Send + Sync + 'static;

    const RESOURCE: Resource;
    /// Heading shown above the panel.
    const TITLE: &'static str;
    /// Banner text when a page fails to load.
    const LOAD_ERROR: &'static str;

    fn forms() -> &'static [Self::Form];
    fn required_fields(form: Self::Form) -> &'static [&'static str];
    fn aggregate(records: &[Self::Record], ctx: &AggregationContext) -> Aggregate;
    /// Turn a complete draft into store edits and POST bodies.
    fn plan(form: Self::Form, draft: &FormDraft) -> Submission;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Identifies one fetch so its response can be matched to the latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub page: u32,
    pub size: u32,
}

/// A submit whose POSTs are still outstanding.
#[derive(Debug, Clone)]
pub struct PendingSubmit<F> {
    pub form: F,
    pub resource: Resource,
    pub bodies: Vec<serde_json::Value>,
    failure_message: &'static str,
    touched: Vec<(&'static str, String)>,
    /// Store generation the edits were applied to.
    generation: u64,
}

#[derive(Debug, Clone)]
pub enum SubmitStart<F> {
    /// A required field was empty; nothing changed.
    Incomplete,
    /// Local-only form; the store is already updated.
    Applied,
    /// Store updated optimistically; POST these bodies, then call `complete_submit`.
    Remote(PendingSubmit<F>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Incomplete,
    Local,
    Confirmed,
    Unsynced,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    pub resource: Resource,
    pub title: String,
    pub state: PanelState,
    pub loading: bool,
    pub error: Option<PanelError>,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
    pub series: BTreeMap<String, Series>,
    pub kpis: Vec<Kpi>,
}

impl PanelSnapshot {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn kpi(&self, title: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.title == title)
    }
}

pub struct Panel<V: PanelView> {
    backend: Arc<dyn MetricsBackend>,
    store: MetricStore,
    state: PanelState,
    page: u32,
    size: u32,
    total_pages: u32,
    error: Option<PanelError>,
    latest_seq: u64,
    drafts: BTreeMap<V::Form, FormDraft>,
    context: Option<AggregationContext>,
    _view: PhantomData<V>,
}

impl<V: PanelView> Panel<V> {
    pub fn new(backend: Arc<dyn MetricsBackend>, page_size: u32) -> Self {
        let drafts = V::forms()
            .iter()
            .map(|&form| (form, FormDraft::new(V::required_fields(form))))
            .collect();

        Self {
            backend,
            store: MetricStore::new(),
            state: PanelState::Idle,
            page: 0,
            size: page_size.max(1),
            total_pages: 1,
            error: None,
            latest_seq: 0,
            drafts,
            context: None,
            _view: PhantomData,
        }
    }

    /// Aggregate against a fixed date instead of the local clock.
    pub fn with_context(mut self, context: AggregationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn backend(&self) -> Arc<dyn MetricsBackend> {
        Arc::clone(&self.backend)
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn error(&self) -> Option<&PanelError> {
        self.error.as_ref()
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn draft(&self, form: V::Form) -> Option<&FormDraft> {
        self.drafts.get(&form)
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            resource: V::RESOURCE,
            title: V::TITLE.to_string(),
            state: self.state,
            loading: self.state == PanelState::Loading,
            error: self.error.clone(),
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
            series: self.store.all_series().clone(),
            kpis: self.store.kpis().to_vec(),
        }
    }

    // -------------------------------------------------------------------------
    // Fetch lifecycle
    // -------------------------------------------------------------------------

    /// Enter `Loading` for the current page and size.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_seq += 1;
        self.state = PanelState::Loading;
        self.error = None;
        FetchTicket {
            seq: self.latest_seq,
            page: self.page,
            size: self.size,
        }
    }

    /// Apply a fetch result. Returns false when the ticket is stale and the result was dropped.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: MetricsResult<Page<serde_json::Value>>,
    ) -> bool {
        if ticket.seq != self.latest_seq {
            log::debug!(
                "Panel {}: dropping stale response #{} (latest #{})",
                V::RESOURCE,
                ticket.seq,
                self.latest_seq
            );
            return false;
        }

        match result {
            Ok(page) => {
                let total_pages = page.page_count();
                let records = decode_records::<V::Record>(page.content);
                let ctx = self.context.unwrap_or_else(AggregationContext::now);
                self.store.replace_all(V::aggregate(&records, &ctx));
                self.total_pages = total_pages;
                self.state = PanelState::Ready;
                log::info!(
                    "Panel {}: loaded page {} ({} records, {} pages)",
                    V::RESOURCE,
                    ticket.page,
                    records.len(),
                    total_pages
                );
            }
            Err(e) => {
                log::warn!("Panel {}: fetch failed: {}", V::RESOURCE, e);
                self.error = Some(PanelError::load(V::LOAD_ERROR));
                self.state = PanelState::Failed;
            }
        }
        true
    }

    /// Fetch the ticket's page and apply the result.
    pub async fn load(&mut self, ticket: FetchTicket) -> bool {
        let result = self
            .backend
            .fetch_page(V::RESOURCE, ticket.page, ticket.size)
            .await;
        self.complete_fetch(ticket, result)
    }

    /// Initial fetch on mount.
    pub async fn mount(&mut self) -> bool {
        let ticket = self.begin_fetch();
        self.load(ticket).await
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Move to `page`, clamped to the known page range.
    ///
    /// Returns `None` when the page does not change.
    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket> {
        let page = page.min(self.total_pages.saturating_sub(1));
        if page == self.page && self.state != PanelState::Idle {
            return None;
        }
        self.page = page;
        Some(self.begin_fetch())
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<FetchTicket> {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Change the page size; always restarts from page 0.
    pub fn set_size(&mut self, size: u32) -> Option<FetchTicket> {
        let size = size.max(1);
        if size == self.size && self.state != PanelState::Idle {
            return None;
        }
        self.size = size;
        self.page = 0;
        Some(self.begin_fetch())
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    pub fn set_field(&mut self, form: V::Form, field: &str, value: impl Into<String>) {
        self.drafts
            .entry(form)
            .or_insert_with(|| FormDraft::new(V::required_fields(form)))
            .set(field, value);
    }

    /// Validate the draft and apply its edits to the store.
    pub fn begin_submit(&mut self, form: V::Form) -> SubmitStart<V::Form> {
        let required = V::required_fields(form);
        let Some(draft) = self.drafts.get(&form) else {
            return SubmitStart::Incomplete;
        };
        if !draft.is_complete(required) {
            log::debug!("Panel {}: {:?} submit ignored, missing fields", V::RESOURCE, form);
            return SubmitStart::Incomplete;
        }

        let submission = V::plan(form, draft);
        let is_remote = submission.is_remote();
        let origin = if is_remote {
            EntryOrigin::Pending
        } else {
            EntryOrigin::Local
        };
        let touched = self.apply_edits(submission.edits, origin);

        if !is_remote {
            self.reset_draft(form);
            return SubmitStart::Applied;
        }

        SubmitStart::Remote(PendingSubmit {
            form,
            resource: V::RESOURCE,
            bodies: submission.remote,
            failure_message: submission.failure_message,
            touched,
            generation: self.store.generation(),
        })
    }

    /// Re-tag the optimistic entries once the POSTs resolve. Failures are not rolled back.
    pub fn complete_submit(
        &mut self,
        pending: PendingSubmit<V::Form>,
        result: MetricsResult<()>,
    ) -> SubmitOutcome {
        let (origin, outcome) = match &result {
            Ok(()) => (EntryOrigin::Confirmed, SubmitOutcome::Confirmed),
            Err(_) => (EntryOrigin::Unsynced, SubmitOutcome::Unsynced),
        };

        // A fetch that landed meanwhile replaced the edited entries with server data.
        if self.store.generation() == pending.generation {
            for (series, key) in &pending.touched {
                self.store.mark(series, key, origin);
            }
        } else {
            log::debug!(
                "Panel {}: {:?} submit resolved after a refetch, leaving server entries untagged",
                V::RESOURCE,
                pending.form
            );
        }

        match result {
            Ok(()) => self.reset_draft(pending.form),
            Err(e) => {
                log::warn!(
                    "Panel {}: {:?} submit failed, keeping optimistic edit: {}",
                    V::RESOURCE,
                    pending.form,
                    e
                );
                self.error = Some(PanelError::submit(pending.failure_message));
            }
        }
        outcome
    }

    /// Submit a form end to end.
    pub async fn submit(&mut self, form: V::Form) -> SubmitOutcome {
        match self.begin_submit(form) {
            SubmitStart::Incomplete => SubmitOutcome::Incomplete,
            SubmitStart::Applied => SubmitOutcome::Local,
            SubmitStart::Remote(pending) => {
                let result = post_all(self.backend.as_ref(), pending.resource, &pending.bodies).await;
                self.complete_submit(pending, result)
            }
        }
    }

    /// Fill the draft from `fields` and submit it.
    pub async fn submit_fields(&mut self, form: V::Form, fields: &[(&str, &str)]) -> SubmitOutcome {
        for (field, value) in fields {
            self.set_field(form, field, *value);
        }
        self.submit(form).await
    }

    fn apply_edits(&mut self, edits: Vec<StoreEdit>, origin: EntryOrigin) -> Vec<(&'static str, String)> {
        let mut touched = Vec::new();
        for edit in edits {
            match edit {
                StoreEdit::Bump {
                    series,
                    key,
                    delta,
                    secondary,
                } => {
                    self.store
                        .append_or_increment_with(series, &key, delta, secondary, origin);
                    touched.push((series, key));
                }
                StoreEdit::PushKpi(kpi) => self.store.push_kpi(kpi),
                StoreEdit::SetKpi { title, value } => self.store.set_kpi(&title, value),
            }
        }
        touched
    }

    fn reset_draft(&mut self, form: V::Form) {
        if let Some(draft) = self.drafts.get_mut(&form) {
            draft.reset();
        }
    }
}

/// POST bodies in order, stopping at the first failure.
pub async fn post_all(
    backend: &dyn MetricsBackend,
    resource: Resource,
    bodies: &[serde_json::Value],
) -> MetricsResult<()> {
    for body in bodies {
        backend.append_record(resource, body.clone()).await?;
    }
    Ok(())
}

/// Decode raw records, skipping any that do not fit the record shape.
fn decode_records<R: DeserializeOwned>(raw: Vec<serde_json::Value>) -> Vec<R> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<R>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Panel: skipping undecodable record: {}", e);
                None
            }
        })
        .collect()
}
