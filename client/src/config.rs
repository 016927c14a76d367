//! Client configuration loaded via OrthoConfig.
//!
//! Accessors fall back to defaults suited to a local development API. Environment variables use the `GRADING_ADMIN_` prefix,
//! e.g. `GRADING_ADMIN_API_URL`.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::http::normalise_base_url;

const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_CREDENTIALS_DIR: &str = ".grading-admin";

/// Configuration errors surfaced while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The configured API URL is not an absolute URL.
    #[error("invalid api url {url:?}: {source}")]
    InvalidApiUrl {
        /// Configured value.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Settings for the grading admin client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GRADING_ADMIN")]
pub struct ClientSettings {
    /// Base URL of the grading REST API.
    pub api_url: Option<String>,
    /// Directory holding the persisted credential pair.
    pub credentials_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

impl ClientSettings {
    /// Resolved API base URL, always ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidApiUrl`] when the configured value is
    /// not an absolute URL.
    pub fn api_url(&self) -> Result<Url, SettingsError> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        normalise_base_url(raw).map_err(|source| SettingsError::InvalidApiUrl {
            url: raw.to_owned(),
            source,
        })
    }

    /// Directory for the credential store.
    pub fn credentials_dir(&self) -> PathBuf {
        self.credentials_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_DIR))
    }

    /// Request timeout; never shorter than one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
