//! Error types for metric panels
//!
//! Runtime failures are classified by where they surface:
//! - Network: fetch/append transport failures and non-2xx responses
//! - Config: unreadable or malformed configuration
//!
//! Panels never propagate these past the controller; they become a fixed
//! per-view banner message.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for metric panel operations
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not readable at {path}: {message}")]
    ConfigUnreadable { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Panel task has stopped")]
    PanelStopped,
}

impl MetricsError {
    /// Returns true if this error came from the REST backend.
    pub fn is_network(&self) -> bool {
        matches!(self, MetricsError::Network(_))
    }
}

impl From<std::io::Error> for MetricsError {
    fn from(err: std::io::Error) -> Self {
        MetricsError::Io(err.to_string())
    }
}

pub type MetricsResult<T> = Result<T, MetricsError>;

/// Serializable error banner for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelError {
    /// Fixed user-facing text, e.g. "Failed to load deal insights".
    pub message: String,
    pub kind: PanelErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelErrorKind {
    Load,
    Submit,
}

impl PanelError {
    pub fn load(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: PanelErrorKind::Load,
        }
    }

    pub fn submit(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: PanelErrorKind::Submit,
        }
    }
}
