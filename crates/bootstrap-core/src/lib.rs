//! Bootstrap Core - pipeline orchestration
//!
//! Drives the three-stage repository bootstrap pipeline:
//! - Scan a repository into a profile
//! - Generate an execution plan from the profile
//! - Execute the plan and collect a report
//!
//! Scanning, planning and execution themselves happen in an external service.
//! This crate owns the data contract between stages, the session store that
//! carries it, status classification of step results, and Markdown export.
//!
//! # Example
//!
//! ```rust,ignore
//! use bootstrap_core::{BootstrapConfig, HttpPipelineService, Pipeline, ScanRequest, SessionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BootstrapConfig::new();
//! let pipeline = Pipeline::new(HttpPipelineService::from_config(&config)?);
//! let mut store = SessionStore::open(&config.session_dir);
//!
//! pipeline.scan(&mut store, ScanRequest::new("https://github.com/acme/demo", "main")).await?;
//! let plan = pipeline.plan(&mut store).await?;
//! let report = pipeline.execute(&mut store).await?;
//!
//! println!("{} steps planned, {}", plan.len(), report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod boundary;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod status;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use boundary::{validate_repo_url, HttpPipelineService, PipelineService};
pub use config::BootstrapConfig;
pub use error::{BoundaryError, ConfigError, PipelineError, StoreError};
pub use export::{export_plan, export_results, plan_report, results_report, ReportDocument};
pub use pipeline::{Pipeline, Stage};
pub use status::{classify, ReportSummary, StatusClass};
pub use store::{FileBackend, MemoryBackend, SessionId, SessionStore, Slot, SlotBackend, SlotValue};
pub use types::{
    ExecutionPlan, ExecutionReport, ExecutionResult, ExecutionStep, GeneratedFile,
    RepositoryProfile, ScanRequest, StepArgs,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Bootstrap Core
    pub use crate::{
        BootstrapConfig, ExecutionPlan, ExecutionReport, HttpPipelineService, Pipeline,
        PipelineError, PipelineService, RepositoryProfile, ScanRequest, SessionStore, StatusClass,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
