//! Request/response boundaries to the external services
//!
//! The scanner, planner and executor live behind [`PipelineService`]. The
//! production implementation talks JSON over HTTP; tests substitute their own.
//! A boundary call is made once: there is no retry and no cancellation.

use crate::config::BootstrapConfig;
use crate::error::{BoundaryError, PipelineError};
use crate::types::{ExecutionPlan, ExecutionReport, RepositoryProfile, ScanRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// External scan/plan/execute services
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Scan a repository into a profile
    async fn scan(&self, request: &ScanRequest) -> Result<RepositoryProfile, BoundaryError>;

    /// Generate a plan for a profile
    async fn plan(&self, profile: &RepositoryProfile) -> Result<ExecutionPlan, BoundaryError>;

    /// Execute a plan
    async fn execute(&self, plan: &ExecutionPlan) -> Result<ExecutionReport, BoundaryError>;
}

/// Check that a repository URL is an absolute http(s) URL with a host
///
/// # Errors
/// `PipelineError::Validation` describing what is wrong with the input
pub fn validate_repo_url(repo_url: &str) -> Result<Url, PipelineError> {
    let url = Url::parse(repo_url.trim())
        .map_err(|e| PipelineError::Validation(format!("invalid repository URL {repo_url:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PipelineError::Validation(format!(
            "unsupported URL scheme {:?} in {repo_url:?}, expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(PipelineError::Validation(format!(
            "repository URL {repo_url:?} has no host"
        )));
    }

    Ok(url)
}

/// HTTP client for the pipeline service
#[derive(Debug, Clone)]
pub struct HttpPipelineService {
    client: Client,
    base_url: Url,
}

impl HttpPipelineService {
    /// Create client for a service base URL
    ///
    /// # Errors
    /// `BoundaryError::Transport` if the HTTP client cannot be built
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, BoundaryError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        tracing::info!(base_url = %base_url, ?timeout, "Created pipeline service client");

        Ok(Self { client, base_url })
    }

    /// Create client from configuration
    ///
    /// # Errors
    /// See [`HttpPipelineService::new`]
    pub fn from_config(config: &BootstrapConfig) -> Result<Self, BoundaryError> {
        Self::new(config.service_url.clone(), config.request_timeout())
    }

    /// Service base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint URL under the base
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a JSON body and decode a JSON response
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, BoundaryError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;

        match response.status() {
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                serde_json::from_slice(&bytes).map_err(|e| BoundaryError::Decode(e.to_string()))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(%url, status = status.as_u16(), "Service rejected request");
                Err(BoundaryError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl PipelineService for HttpPipelineService {
    async fn scan(&self, request: &ScanRequest) -> Result<RepositoryProfile, BoundaryError> {
        self.post("scan", request).await
    }

    async fn plan(&self, profile: &RepositoryProfile) -> Result<ExecutionPlan, BoundaryError> {
        self.post("plan", profile).await
    }

    async fn execute(&self, plan: &ExecutionPlan) -> Result<ExecutionReport, BoundaryError> {
        self.post("execute", plan).await
    }
}
