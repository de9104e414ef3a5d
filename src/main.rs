//! metric-panels: fetch one page of one dashboard and print its snapshot as JSON.
//!
//! Usage: `metric-panels --view deal-insights --page 0 --size 20`

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use metric_panels::client::rest::RestMetricsClient;
use metric_panels::client::{MetricsBackend, Resource};
use metric_panels::config::{load_config, load_config_from, PanelsConfig};
use metric_panels::error::{MetricsError, MetricsResult};
use metric_panels::panel::{Panel, PanelState, PanelView};
use metric_panels::views::{ActivityView, DealsView, LeadsView, OverviewView};

/// Command line and environment configuration for the snapshot tool
#[derive(Parser, Debug, Clone)]
#[clap(name = "metric-panels")]
#[clap(about = "Fetch a CRM dashboard page and print its chart series and KPIs")]
struct Cli {
    /// Dashboard resource: activity-stats, deal-insights, lead-analytics, overview-metrics
    #[clap(long, default_value = "deal-insights")]
    view: String,

    /// Zero-based page number, clamped to the pages the backend reports
    #[clap(long, default_value = "0")]
    page: u32,

    /// Page size; defaults to the configured default page size
    #[clap(long)]
    size: Option<u32>,

    /// API base URL, overriding the config file
    #[clap(long, env = "METRIC_PANELS_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[clap(long, env = "METRIC_PANELS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Config file (default: ~/.metric-panels/config.json)
    #[clap(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> MetricsResult<()> {
    let resource = Resource::from_path(&cli.view)
        .ok_or_else(|| MetricsError::Config(format!("Unknown view {:?}", cli.view)))?;
    let config = effective_config(&cli)?;
    let size = cli.size.unwrap_or(config.default_page_size);

    log::info!("Fetching {} page {} (size {}) from {}", resource, cli.page, size, config.base_url);

    let backend: Arc<dyn MetricsBackend> = Arc::new(RestMetricsClient::new(&config)?);
    let (json, failure) = match resource {
        Resource::ActivityStats => snapshot_json::<ActivityView>(backend, cli.page, size).await?,
        Resource::DealInsights => snapshot_json::<DealsView>(backend, cli.page, size).await?,
        Resource::LeadAnalytics => snapshot_json::<LeadsView>(backend, cli.page, size).await?,
        Resource::OverviewMetrics => snapshot_json::<OverviewView>(backend, cli.page, size).await?,
    };

    // The snapshot is printed either way so the banner is visible to the caller.
    println!("{}", json);
    match failure {
        Some(message) => Err(MetricsError::Network(message)),
        None => Ok(()),
    }
}

fn effective_config(cli: &Cli) -> MetricsResult<PanelsConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if cli.timeout_secs.is_some() {
        config.request_timeout_secs = cli.timeout_secs;
    }
    config.validate()
}

async fn snapshot_json<V: PanelView>(
    backend: Arc<dyn MetricsBackend>,
    page: u32,
    size: u32,
) -> MetricsResult<(String, Option<String>)> {
    let mut panel = Panel::<V>::new(backend, size);
    panel.mount().await;

    if let Some(ticket) = panel.set_page(page) {
        panel.load(ticket).await;
    }

    let json = serde_json::to_string_pretty(&panel.snapshot())
        .map_err(|e| MetricsError::Io(format!("Failed to encode snapshot: {}", e)))?;
    Ok((json, fetch_failure(&panel)))
}

/// The load banner when the last fetch failed, so the process exits non-zero.
fn fetch_failure<V: PanelView>(panel: &Panel<V>) -> Option<String> {
    if panel.state() != PanelState::Failed {
        return None;
    }
    Some(
        panel
            .error()
            .map(|err| err.message.clone())
            .unwrap_or_else(|| V::LOAD_ERROR.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn backend(base_url: String) -> Arc<dyn MetricsBackend> {
        let config = PanelsConfig {
            base_url,
            ..PanelsConfig::default()
        };
        Arc::new(RestMetricsClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_failed_fetch_reports_load_banner() {
        let router = Router::new().route(
            "/api/deal-insights/paged",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = serve(router).await;

        let (json, failure) = snapshot_json::<DealsView>(backend(base_url), 0, 10).await.unwrap();
        assert_eq!(failure.as_deref(), Some("Failed to load deal insights"));
        assert!(json.contains("Failed to load deal insights"));
    }

    #[tokio::test]
    async fn test_successful_fetch_reports_no_failure() {
        let router = Router::new().route(
            "/api/deal-insights/paged",
            get(|| async {
                Json(serde_json::json!({"content": [{"stage": "Lead", "count": 1}], "totalPages": 1}))
            }),
        );
        let base_url = serve(router).await;

        let (_, failure) = snapshot_json::<DealsView>(backend(base_url), 0, 10).await.unwrap();
        assert!(failure.is_none());
    }
}
