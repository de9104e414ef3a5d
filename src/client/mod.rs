//! Remote metrics backend.
//!
//! Every panel talks to one REST resource through [`MetricsBackend`]: a
//! paginated GET and a POST, both without retry or caching.
//! [`rest::RestMetricsClient`] is the HTTP implementation.

pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MetricsResult;
use crate::types::Page;

/// REST resources backing the four dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    ActivityStats,
    DealInsights,
    LeadAnalytics,
    OverviewMetrics,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::ActivityStats,
        Resource::DealInsights,
        Resource::LeadAnalytics,
        Resource::OverviewMetrics,
    ];

    /// Path segment under the API base.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::ActivityStats => "activity-stats",
            Resource::DealInsights => "deal-insights",
            Resource::LeadAnalytics => "lead-analytics",
            Resource::OverviewMetrics => "overview-metrics",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Transport seam between panels and the backend.
///
/// Records stay as raw JSON here; each panel decodes its own record type.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// `GET /<resource>/paged?page=&size=`.
    async fn fetch_page(
        &self,
        resource: Resource,
        page: u32,
        size: u32,
    ) -> MetricsResult<Page<serde_json::Value>>;

    /// `POST /<resource>` with one record (no id). Returns the created record.
    async fn append_record(
        &self,
        resource: Resource,
        record: serde_json::Value,
    ) -> MetricsResult<serde_json::Value>;
}

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{MetricsBackend, Resource};
    use crate::error::{MetricsError, MetricsResult};
    use crate::types::Page;

    type PageFn = dyn Fn(u32, u32) -> MetricsResult<Page<serde_json::Value>> + Send + Sync;

    /// In-memory backend that serves pages from a closure and records every call.
    pub struct FakeBackend {
        pages: Box<PageFn>,
        fail_posts: bool,
        delays: HashMap<u32, Duration>,
        fetches: Mutex<Vec<(Resource, u32, u32)>>,
        posts: Mutex<Vec<(Resource, serde_json::Value)>>,
    }

    impl FakeBackend {
        pub fn with_pages(
            pages: impl Fn(u32, u32) -> MetricsResult<Page<serde_json::Value>> + Send + Sync + 'static,
        ) -> Self {
            Self {
                pages: Box::new(pages),
                fail_posts: false,
                delays: HashMap::new(),
                fetches: Mutex::new(Vec::new()),
                posts: Mutex::new(Vec::new()),
            }
        }

        /// Every POST fails with a network error.
        pub fn failing_posts(mut self) -> Self {
            self.fail_posts = true;
            self
        }

        /// Hold the response for `page` before answering.
        pub fn delay_page(mut self, page: u32, delay: Duration) -> Self {
            self.delays.insert(page, delay);
            self
        }

        pub fn fetches(&self) -> Vec<(Resource, u32, u32)> {
            self.fetches.lock().unwrap().clone()
        }

        pub fn posts(&self) -> Vec<(Resource, serde_json::Value)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetricsBackend for FakeBackend {
        async fn fetch_page(
            &self,
            resource: Resource,
            page: u32,
            size: u32,
        ) -> MetricsResult<Page<serde_json::Value>> {
            self.fetches.lock().unwrap().push((resource, page, size));
            if let Some(delay) = self.delays.get(&page) {
                tokio::time::sleep(*delay).await;
            }
            (self.pages)(page, size)
        }

        async fn append_record(
            &self,
            resource: Resource,
            record: serde_json::Value,
        ) -> MetricsResult<serde_json::Value> {
            self.posts.lock().unwrap().push((resource, record.clone()));
            if self.fail_posts {
                return Err(MetricsError::Network(format!(
                    "POST /{} failed with 500 Internal Server Error",
                    resource
                )));
            }
            Ok(record)
        }
    }

    pub fn page_of(content: Vec<serde_json::Value>, total_pages: u32) -> Page<serde_json::Value> {
        Page::new(content, total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_path(resource.path()), Some(resource));
        }
        assert_eq!(Resource::from_path("pipelines"), None);
    }

    #[test]
    fn test_resource_serde_matches_path() {
        let json = serde_json::to_value(Resource::LeadAnalytics).unwrap();
        assert_eq!(json, "lead-analytics");
    }
}
