//! HTTP client for the CRM metrics REST API.
//!
//! Plain reqwest, no auth headers, no retries. Non-2xx responses become
//! [`MetricsError::Network`] with the status and body text.

use async_trait::async_trait;
use url::Url;

use super::{MetricsBackend, Resource};
use crate::config::PanelsConfig;
use crate::error::{MetricsError, MetricsResult};
use crate::types::Page;

pub struct RestMetricsClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestMetricsClient {
    pub fn new(config: &PanelsConfig) -> MetricsResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MetricsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: parse_base(&config.base_url)?,
        })
    }

    /// `{base}/{resource}`
    pub fn resource_url(&self, resource: Resource) -> MetricsResult<Url> {
        self.join(&[resource.path()])
    }

    /// `{base}/{resource}/paged?page={page}&size={size}`
    pub fn paged_url(&self, resource: Resource, page: u32, size: u32) -> MetricsResult<Url> {
        let mut url = self.join(&[resource.path(), "paged"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        Ok(url)
    }

    fn join(&self, segments: &[&str]) -> MetricsResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MetricsError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(resp: reqwest::Response, what: &str) -> MetricsResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(MetricsError::Network(format!("{} failed with {}: {}", what, status, text)))
    }
}

fn parse_base(base: &str) -> MetricsResult<Url> {
    Url::parse(base).map_err(|e| MetricsError::Config(format!("Invalid base URL {:?}: {}", base, e)))
}

#[async_trait]
impl MetricsBackend for RestMetricsClient {
    async fn fetch_page(
        &self,
        resource: Resource,
        page: u32,
        size: u32,
    ) -> MetricsResult<Page<serde_json::Value>> {
        let url = self.paged_url(resource, page, size)?;
        log::debug!("RestMetricsClient: GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetricsError::Network(format!("GET {} request failed: {}", resource, e)))?;
        let resp = Self::check(resp, &format!("GET {}", resource)).await?;

        resp.json::<Page<serde_json::Value>>()
            .await
            .map_err(|e| MetricsError::Network(format!("Failed to parse {} page: {}", resource, e)))
    }

    async fn append_record(
        &self,
        resource: Resource,
        record: serde_json::Value,
    ) -> MetricsResult<serde_json::Value> {
        let url = self.resource_url(resource)?;
        log::debug!("RestMetricsClient: POST {}", url);

        let resp = self
            .client
            .post(url)
            .json(&record)
            .send()
            .await
            .map_err(|e| MetricsError::Network(format!("POST {} request failed: {}", resource, e)))?;
        let resp = Self::check(resp, &format!("POST {}", resource)).await?;

        // The created record is informational; an empty or non-JSON body still counts as success.
        let body = resp.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }
}
