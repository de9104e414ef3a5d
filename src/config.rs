//! Panel configuration stored in ~/.metric-panels/config.json.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, MetricsResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelsConfig {
    /// Base of every resource URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Per-request timeout. Unset means a hung request keeps the panel loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_page_size: default_page_size(),
            request_timeout_secs: None,
        }
    }
}

impl PanelsConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Normalize the base URL and reject unusable sizes.
    pub fn validate(mut self) -> MetricsResult<Self> {
        url::Url::parse(&self.base_url)
            .map_err(|e| MetricsError::Config(format!("Invalid baseUrl {:?}: {}", self.base_url, e)))?;
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        if self.default_page_size == 0 {
            return Err(MetricsError::Config("defaultPageSize must be at least 1".into()));
        }
        Ok(self)
    }
}

/// Default location of the config file.
pub fn config_path() -> MetricsResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MetricsError::Config("Could not find home directory".into()))?;
    Ok(home.join(".metric-panels").join("config.json"))
}

/// Load the config from its default location. A missing file yields defaults.
pub fn load_config() -> MetricsResult<PanelsConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> MetricsResult<PanelsConfig> {
    if !path.exists() {
        log::debug!("Config: {} not found, using defaults", path.display());
        return Ok(PanelsConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| MetricsError::ConfigUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let config: PanelsConfig = serde_json::from_str(&content)
        .map_err(|e| MetricsError::Config(format!("Failed to parse config: {}", e)))?;

    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(&temp.path().join("config.json")).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.default_page_size, 10);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults_and_trims_slash() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "baseUrl": "http://crm.internal:9000/api/", "requestTimeoutSecs": 15 }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.base_url, "http://crm.internal:9000/api");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "baseUrl": "not a url" }"#).unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, MetricsError::Config(_)));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "defaultPageSize": 0 }"#).unwrap();

        assert!(load_config_from(&path).is_err());
    }
}
