//! Pipeline configuration
//!
//! Layered the usual way: defaults, then an optional TOML file, then
//! environment overrides. The CLI applies its flags on top.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the service URL
pub const ENV_SERVICE_URL: &str = "AGENT_BOOTSTRAP_SERVICE_URL";
/// Environment variable overriding the session directory
pub const ENV_SESSION_DIR: &str = "AGENT_BOOTSTRAP_SESSION_DIR";
/// Environment variable overriding the request timeout
pub const ENV_TIMEOUT_SECS: &str = "AGENT_BOOTSTRAP_TIMEOUT_SECS";

/// Bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Base URL of the scan/plan/execute service
    pub service_url: Url,
    /// Directory holding the session slots
    pub session_dir: PathBuf,
    /// Branch used when a scan does not name one
    pub default_branch: String,
    /// Upper bound on a single service call, unbounded when unset
    pub request_timeout_secs: Option<u64>,
    /// Directory exported reports are written to
    pub export_dir: PathBuf,
}

impl BootstrapConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With service URL
    #[inline]
    #[must_use]
    pub fn with_service_url(mut self, url: Url) -> Self {
        self.service_url = url;
        self
    }

    /// With session directory
    #[inline]
    #[must_use]
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// With export directory
    #[inline]
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parse configuration from TOML text
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    /// `ConfigError::Parse` if the text is not valid for this shape
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides from the process environment
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` if a variable holds an invalid value
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides from a lookup function
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` if a value is invalid
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SERVICE_URL) {
            self.service_url = Url::parse(&value).map_err(|_| ConfigError::InvalidEnv {
                key: ENV_SERVICE_URL,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_SESSION_DIR) {
            self.session_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            let secs = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_TIMEOUT_SECS,
                value: value.clone(),
            })?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(self)
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            session_dir: PathBuf::from(".agent-bootstrap/session"),
            default_branch: "main".to_string(),
            request_timeout_secs: None,
            export_dir: PathBuf::from("."),
        }
    }
}

fn default_service_url() -> Url {
    Url::parse("http://127.0.0.1:8080").expect("default service URL is valid")
}
