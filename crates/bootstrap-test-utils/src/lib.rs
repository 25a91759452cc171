//! Testing utilities for the bootstrap workspace
//!
//! Shared fixtures and an in-process pipeline service.

#![allow(missing_docs)]

use async_trait::async_trait;
use bootstrap_core::{
    BoundaryError, ExecutionPlan, ExecutionReport, ExecutionResult, ExecutionStep, GeneratedFile,
    PipelineService, RepositoryProfile, ScanRequest,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Mutex;

/// Profile from the acme/demo scenario
pub fn demo_profile() -> RepositoryProfile {
    RepositoryProfile::new("https://github.com/acme/demo", "main", "demo")
        .with_languages(["Python", "TypeScript"])
        .with_frameworks(["FastAPI"])
        .with_database("Postgres")
}

/// Single write_file step from the acme/demo scenario
pub fn demo_step() -> ExecutionStep {
    ExecutionStep::new("write_file")
        .with_file_path("README.md")
        .with_content("# Demo")
        .with_success_check("file exists")
        .with_on_fail("retry")
}

pub fn demo_plan() -> ExecutionPlan {
    ExecutionPlan::new().with_step(demo_step())
}

/// Multi-step plan resembling real planner output
pub fn container_plan() -> ExecutionPlan {
    ExecutionPlan::new()
        .with_step(
            ExecutionStep::new("create_dockerfile")
                .with_file_path("Dockerfile")
                .with_content("FROM python:3.12-slim\nCOPY . /app")
                .with_arg("base_image", "python:3.12-slim")
                .with_success_check("Dockerfile exists")
                .with_on_fail("fall back to python:3.12"),
        )
        .with_step(
            ExecutionStep::new("write_docker_compose")
                .with_file_path("docker-compose.yml")
                .with_success_check("compose file validates"),
        )
        .with_step(ExecutionStep::new("deploy_to_cluster").with_arg("manifest_path", "k8s/"))
}

/// Fixed report timestamp
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|d| d.and_hms_opt(14, 3, 22))
        .unwrap()
}

/// Canned reply of a fake boundary
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Succeed with a value
    Ok(T),
    /// Fail with an HTTP status
    Status(u16, String),
    /// Fail before reaching the service
    Transport(String),
}

impl<T: Clone> Reply<T> {
    fn produce(&self) -> Result<T, BoundaryError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Status(status, body) => Err(BoundaryError::Status {
                status: *status,
                body: body.clone(),
            }),
            Reply::Transport(message) => Err(BoundaryError::Transport(message.clone())),
        }
    }
}

/// Call received by the fake service
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Scan(ScanRequest),
    Plan(RepositoryProfile),
    Execute(ExecutionPlan),
}

/// In-process pipeline service with canned replies
///
/// Without an explicit execute reply, the plan is "executed" step by step:
/// every step succeeds with its success check as details, and steps carrying
/// both a file path and content emit a generated file.
#[derive(Debug)]
pub struct FakePipelineService {
    scan: Reply<RepositoryProfile>,
    plan: Reply<ExecutionPlan>,
    execute: Option<Reply<ExecutionReport>>,
    calls: Mutex<Vec<Call>>,
}

impl FakePipelineService {
    pub fn new(profile: RepositoryProfile, plan: ExecutionPlan) -> Self {
        Self {
            scan: Reply::Ok(profile),
            plan: Reply::Ok(plan),
            execute: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_profile(), demo_plan())
    }

    pub fn with_scan_reply(mut self, reply: Reply<RepositoryProfile>) -> Self {
        self.scan = reply;
        self
    }

    pub fn with_plan_reply(mut self, reply: Reply<ExecutionPlan>) -> Self {
        self.plan = reply;
        self
    }

    pub fn with_execute_reply(mut self, reply: Reply<ExecutionReport>) -> Self {
        self.execute = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Report the fake produces for a plan when no reply is configured
pub fn simulated_report(plan: &ExecutionPlan) -> ExecutionReport {
    let execution_results = plan
        .steps()
        .iter()
        .map(|step| {
            ExecutionResult::new(
                step.tool.clone(),
                "success",
                step.success_check.clone().unwrap_or_default(),
            )
        })
        .collect();

    let files = plan
        .steps()
        .iter()
        .filter_map(|step| {
            let file_path = step.args.file_path.clone()?;
            let content = step.args.content.clone()?;
            Some(GeneratedFile {
                tool: step.tool.clone(),
                file_path,
                content,
            })
        })
        .collect();

    ExecutionReport {
        execution_results,
        files,
    }
}

#[async_trait]
impl PipelineService for FakePipelineService {
    async fn scan(&self, request: &ScanRequest) -> Result<RepositoryProfile, BoundaryError> {
        self.record(Call::Scan(request.clone()));
        self.scan.produce()
    }

    async fn plan(&self, profile: &RepositoryProfile) -> Result<ExecutionPlan, BoundaryError> {
        self.record(Call::Plan(profile.clone()));
        self.plan.produce()
    }

    async fn execute(&self, plan: &ExecutionPlan) -> Result<ExecutionReport, BoundaryError> {
        self.record(Call::Execute(plan.clone()));
        match &self.execute {
            Some(reply) => reply.produce(),
            None => Ok(simulated_report(plan)),
        }
    }
}
