//! # Configuration Management
//!
//! This module provides configuration for the client core. Configuration is
//! read from the `MYCLOUD_CLIENT_CONFIG` environment variable as JSON and
//! falls back to defaults for a backend served on `localhost:8000`.
//!
//! ## Configuration Options
//!
//! - `base_url`: Backend origin, without a trailing slash
//! - `api_prefix`: Path prefix of the REST API (default `/api`)
//! - `csrf_cookie_name`: Cookie holding the CSRF token
//! - `csrf_header_name`: Header the token is echoed in on mutating requests
//! - `request_timeout_secs`: Per-request timeout used by the HTTP transport
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = ClientConfig::load()?;
//! println!("API root: {}", config.api_root());
//! ```

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_API_PREFIX, DEFAULT_BASE_URL, DEFAULT_CSRF_COOKIE, DEFAULT_CSRF_HEADER,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::{ApiError, AppResult};
use serde::{Deserialize, Serialize};

/// Configuration structure for the client core.
///
/// Missing fields in the JSON source take their default values, so a partial
/// document such as `{"base_url": "https://cloud.example.com"}` is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://cloud.example.com`.
    pub base_url: String,

    /// Path prefix of the REST API.
    pub api_prefix: String,

    /// Name of the cookie the backend stores the CSRF token in.
    pub csrf_cookie_name: String,

    /// Header used to echo the CSRF token on POST/PATCH/DELETE.
    pub csrf_header_name: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header_name: DEFAULT_CSRF_HEADER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the environment with fallback to defaults.
    ///
    /// # Returns
    ///
    /// Returns the parsed configuration, or the defaults if the variable is
    /// unset.
    ///
    /// # Error Handling
    ///
    /// - If the variable is unset, uses defaults
    /// - Invalid JSON in the variable is reported as `ApiError::Config`
    pub fn load() -> AppResult<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(raw) => {
                tracing::info!("Configuration loaded from {}", CONFIG_ENV_VAR);
                Self::from_json(&raw)
            }
            Err(_) => {
                tracing::info!("{} not set, using default configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base_url must be an http(s) origin, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ApiError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Absolute root of the REST API, e.g. `http://localhost:8000/api`.
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }

    /// Absolute URL for an API path such as `/files/`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_root(), path)
    }
}
