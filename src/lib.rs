//! Metric panels for CRM dashboards.
//!
//! Each dashboard view follows one loop: fetch a page of flat records from a
//! REST resource, aggregate it into chart series and KPI cards, keep that in
//! a local store, and let forms edit the store optimistically while their
//! POSTs are in flight.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod numeric;
pub mod panel;
pub mod store;
pub mod types;
pub mod views;

pub use client::rest::RestMetricsClient;
pub use client::{MetricsBackend, Resource};
pub use config::PanelsConfig;
pub use error::{MetricsError, MetricsResult, PanelError};
pub use panel::actor::{spawn_panel, PanelHandle};
pub use panel::{Panel, PanelSnapshot, PanelState, PanelView, SubmitOutcome};
