//! Core types for the bootstrap pipeline
//!
//! Defines the records that flow between pipeline stages:
//! - Scan requests and repository profiles
//! - Execution steps and plans
//! - Execution results, generated files and reports
//!
//! Field names are the wire names used by the external services.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request sent to the scanning service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Repository URL (http or https)
    pub repo_url: String,
    /// Branch or ref to check out
    pub branch: String,
    /// Access token for private repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl ScanRequest {
    /// Create new scan request
    #[inline]
    #[must_use]
    pub fn new(repo_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: branch.into(),
            github_token: None,
        }
    }

    /// With access token
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for ScanRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRequest")
            .field("repo_url", &self.repo_url)
            .field("branch", &self.branch)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Repository profile produced by the scanning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryProfile {
    /// Repository URL as scanned
    pub repo_url: String,
    /// Branch that was scanned
    #[serde(default)]
    pub branch: Option<String>,
    /// Inferred project name
    pub project_name: String,
    /// Detected languages, in detection order
    #[serde(default)]
    pub languages: Vec<String>,
    /// Detected frameworks, in detection order
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// Detected database, if any
    #[serde(default)]
    pub database: Option<String>,
    /// Whether the repository has tests
    #[serde(default)]
    pub has_tests: bool,
    /// Detected entrypoints
    #[serde(default)]
    pub entrypoints: Vec<String>,
    /// Detected infrastructure descriptors
    #[serde(default)]
    pub infrastructure: Map<String, Value>,
    /// Files the scanner looked at
    #[serde(default)]
    pub discovered_files: Vec<String>,
    /// Free-form note from the scanner
    #[serde(default)]
    pub note: Option<String>,
}

impl RepositoryProfile {
    /// Create new profile with the identifying fields set
    #[inline]
    #[must_use]
    pub fn new(
        repo_url: impl Into<String>,
        branch: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: Some(branch.into()),
            project_name: project_name.into(),
            languages: Vec::new(),
            frameworks: Vec::new(),
            database: None,
            has_tests: false,
            entrypoints: Vec::new(),
            infrastructure: Map::new(),
            discovered_files: Vec::new(),
            note: None,
        }
    }

    /// With languages
    #[inline]
    #[must_use]
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// With frameworks
    #[inline]
    #[must_use]
    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// With database
    #[inline]
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// True when no field carries information
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repo_url.is_empty()
            && self.branch.as_deref().map_or(true, str::is_empty)
            && self.project_name.is_empty()
            && self.languages.is_empty()
            && self.frameworks.is_empty()
            && self.database.is_none()
            && !self.has_tests
            && self.entrypoints.is_empty()
            && self.infrastructure.is_empty()
            && self.discovered_files.is_empty()
            && self.note.is_none()
    }
}

/// Tool arguments of a step
///
/// `file_path` and `content` are the fields the pipeline itself reads; every
/// other tool-specific field is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepArgs {
    /// Target file of the tool, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Content the tool writes, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Remaining tool-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One planned tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// Tool name
    pub tool: String,
    /// Tool arguments
    #[serde(default)]
    pub args: StepArgs,
    /// How success is checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_check: Option<String>,
    /// What to do on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_fail: Option<String>,
}

impl ExecutionStep {
    /// Create new step for a tool
    #[inline]
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: StepArgs::default(),
            success_check: None,
            on_fail: None,
        }
    }

    /// With file path argument
    #[inline]
    #[must_use]
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.args.file_path = Some(file_path.into());
        self
    }

    /// With content argument
    #[inline]
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.args.content = Some(content.into());
        self
    }

    /// With tool-specific argument
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.extra.insert(key.into(), value.into());
        self
    }

    /// With success check
    #[inline]
    #[must_use]
    pub fn with_success_check(mut self, check: impl Into<String>) -> Self {
        self.success_check = Some(check.into());
        self
    }

    /// With failure action
    #[inline]
    #[must_use]
    pub fn with_on_fail(mut self, action: impl Into<String>) -> Self {
        self.on_fail = Some(action.into());
        self
    }
}

/// Ordered sequence of steps
///
/// Serialized as a bare JSON array. Order is execution order and report order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionPlan {
    steps: Vec<ExecutionStep>,
}

impl ExecutionPlan {
    /// Create empty plan
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    #[inline]
    #[must_use]
    pub fn with_step(mut self, step: ExecutionStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Steps in plan order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if plan has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Vec<ExecutionStep>> for ExecutionPlan {
    fn from(steps: Vec<ExecutionStep>) -> Self {
        Self { steps }
    }
}

impl FromIterator<ExecutionStep> for ExecutionPlan {
    fn from_iter<I: IntoIterator<Item = ExecutionStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Tool that ran
    pub tool: String,
    /// Raw status as reported by the execution service
    pub status: String,
    /// Human-readable details
    #[serde(default)]
    pub details: String,
}

impl ExecutionResult {
    /// Create new result
    #[inline]
    #[must_use]
    pub fn new(
        tool: impl Into<String>,
        status: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            status: status.into(),
            details: details.into(),
        }
    }
}

/// File emitted by execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Tool that produced the file
    pub tool: String,
    /// Path of the file
    pub file_path: String,
    /// File content
    pub content: String,
}

/// Results of running a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Per-step results, in plan order
    pub execution_results: Vec<ExecutionResult>,
    /// Generated files, in emission order
    #[serde(default)]
    pub files: Vec<GeneratedFile>,
}
