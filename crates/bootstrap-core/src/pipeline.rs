//! Pipeline stage handlers
//!
//! Each stage is one user action: read its input from the session store,
//! make one boundary call, and store the output only if the call succeeded.
//! Stages run strictly in order because each consumes the previous stage's
//! stored output; a stage whose input is missing is refused before any remote
//! call is made.

use crate::boundary::{validate_repo_url, PipelineService};
use crate::error::{BoundaryError, PipelineError};
use crate::store::{SessionStore, SlotValue};
use crate::types::{ExecutionPlan, ExecutionReport, RepositoryProfile, ScanRequest};
use std::fmt;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Scan a repository
    Scan,
    /// Generate a plan
    Plan,
    /// Execute the plan
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Scan => f.write_str("scan"),
            Stage::Plan => f.write_str("plan"),
            Stage::Execute => f.write_str("execute"),
        }
    }
}

/// Stage handlers over a pipeline service
///
/// The pipeline holds no state of its own; the caller passes the session
/// store into every stage.
#[derive(Debug, Clone)]
pub struct Pipeline<S> {
    service: S,
}

impl<S: PipelineService> Pipeline<S> {
    /// Create pipeline over a service
    #[inline]
    #[must_use]
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Underlying service
    #[inline]
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Scan a repository and store its profile
    ///
    /// # Errors
    /// - `PipelineError::Validation` if `repo_url` is malformed or the scanner
    ///   rejects the request (4xx); no remote call is made for local failures
    /// - `PipelineError::Boundary` for any other remote failure
    /// - `PipelineError::Store` if the profile cannot be written
    ///
    /// Surrounding whitespace is stripped from `repo_url` before it is
    /// checked and sent. On error the scan slot is left as it was.
    pub async fn scan(
        &self,
        store: &mut SessionStore,
        mut request: ScanRequest,
    ) -> Result<RepositoryProfile, PipelineError> {
        request.repo_url = request.repo_url.trim().to_string();
        tracing::info!(session = %store.session_id(), repo_url = %request.repo_url, branch = %request.branch, "Scanning repository");

        if let Err(e) = validate_repo_url(&request.repo_url) {
            tracing::warn!("Scan rejected locally: {}", e);
            return Err(e);
        }

        let profile = self.service.scan(&request).await.map_err(|e| {
            if e.is_client_error() {
                PipelineError::Validation(format!("scanner rejected {}: {e}", request.repo_url))
            } else {
                boundary_failure(Stage::Scan, e)
            }
        })?;

        store.put_profile(&profile)?;
        tracing::info!(
            project = %profile.project_name,
            languages = profile.languages.len(),
            frameworks = profile.frameworks.len(),
            "Scan stored"
        );
        Ok(profile)
    }

    /// Generate a plan from the stored profile and store it
    ///
    /// # Errors
    /// - `PipelineError::MissingPrerequisite` if no profile is stored
    /// - `PipelineError::Boundary` if the planner call fails
    /// - `PipelineError::Store` if the plan cannot be written
    pub async fn plan(&self, store: &mut SessionStore) -> Result<ExecutionPlan, PipelineError> {
        let profile: RepositoryProfile = require(store, Stage::Plan)?;
        tracing::info!(session = %store.session_id(), project = %profile.project_name, "Generating plan");

        let plan = self
            .service
            .plan(&profile)
            .await
            .map_err(|e| boundary_failure(Stage::Plan, e))?;

        store.put_plan(&plan)?;
        tracing::info!(steps = plan.len(), "Plan stored");
        Ok(plan)
    }

    /// Execute the stored plan and store the report
    ///
    /// Zero-step plans are sent as-is.
    ///
    /// # Errors
    /// - `PipelineError::MissingPrerequisite` if no plan is stored
    /// - `PipelineError::Boundary` if the executor call fails
    /// - `PipelineError::Store` if the report cannot be written
    pub async fn execute(&self, store: &mut SessionStore) -> Result<ExecutionReport, PipelineError> {
        let plan: ExecutionPlan = require(store, Stage::Execute)?;
        tracing::info!(session = %store.session_id(), steps = plan.len(), "Executing plan");

        let report = self
            .service
            .execute(&plan)
            .await
            .map_err(|e| boundary_failure(Stage::Execute, e))?;

        if report.execution_results.len() > plan.len() {
            tracing::warn!(
                steps = plan.len(),
                results = report.execution_results.len(),
                "Executor returned more results than steps"
            );
        }

        store.put_report(&report)?;
        tracing::info!(summary = %report.summary(), files = report.files.len(), "Execution stored");
        Ok(report)
    }
}

/// Stored input of a stage, or a guard refusal naming the empty slot
fn require<T: SlotValue>(store: &SessionStore, stage: Stage) -> Result<T, PipelineError> {
    store.get().ok_or_else(|| {
        tracing::warn!(%stage, slot = %T::SLOT, "Stage refused, input slot is empty");
        PipelineError::MissingPrerequisite {
            stage,
            slot: T::SLOT,
        }
    })
}

fn boundary_failure(stage: Stage, source: BoundaryError) -> PipelineError {
    tracing::error!("{} call failed: {}", stage, source);
    PipelineError::Boundary { stage, source }
}
