//! Status classification and result aggregation
//!
//! Execution results carry an open status string. For presentation and
//! reporting each status falls into exactly one of three buckets. A failed
//! step is data: it never stops aggregation of the results after it.

use crate::types::{ExecutionReport, ExecutionResult};
use std::fmt;

/// Status literal for a successful step
pub const STATUS_SUCCESS: &str = "success";

/// Status literal for a failed step
pub const STATUS_FAILED: &str = "failed";

/// Render bucket of a step status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Step succeeded
    Success,
    /// Step failed
    Failure,
    /// Anything else (skipped, pending, unknown)
    Neutral,
}

impl StatusClass {
    /// Display marker
    #[inline]
    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self {
            StatusClass::Success => "✅",
            StatusClass::Failure => "❌",
            StatusClass::Neutral => "⚠️",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Success => f.write_str("success"),
            StatusClass::Failure => f.write_str("failure"),
            StatusClass::Neutral => f.write_str("neutral"),
        }
    }
}

/// Classify a raw status
///
/// Only the exact literals `"success"` and `"failed"` are recognized.
#[inline]
#[must_use]
pub fn classify(status: &str) -> StatusClass {
    match status {
        STATUS_SUCCESS => StatusClass::Success,
        STATUS_FAILED => StatusClass::Failure,
        _ => StatusClass::Neutral,
    }
}

impl ExecutionResult {
    /// Render bucket of this result
    #[inline]
    #[must_use]
    pub fn class(&self) -> StatusClass {
        classify(&self.status)
    }
}

/// Per-bucket counts over a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Successful steps
    pub success: usize,
    /// Failed steps
    pub failure: usize,
    /// Neutral steps
    pub neutral: usize,
}

impl ReportSummary {
    /// Total number of results counted
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.failure + self.neutral
    }

    /// Check if any step failed
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure > 0
    }

    fn record(&mut self, class: StatusClass) {
        match class {
            StatusClass::Success => self.success += 1,
            StatusClass::Failure => self.failure += 1,
            StatusClass::Neutral => self.neutral += 1,
        }
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps: {} succeeded, {} failed, {} other",
            self.total(),
            self.success,
            self.failure,
            self.neutral
        )
    }
}

impl ExecutionReport {
    /// Results paired with their bucket, in report order
    pub fn classified(&self) -> impl Iterator<Item = (&ExecutionResult, StatusClass)> + '_ {
        self.execution_results.iter().map(|r| (r, r.class()))
    }

    /// Count results per bucket
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for (result, class) in self.classified() {
            if class == StatusClass::Neutral {
                tracing::debug!(tool = %result.tool, status = %result.status, "Unrecognized step status");
            }
            summary.record(class);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn recognized_literals() {
        assert_eq!(classify("success"), StatusClass::Success);
        assert_eq!(classify("failed"), StatusClass::Failure);
    }

    #[test]
    fn everything_else_is_neutral() {
        for status in ["", "pending", "timeout", "skipped", "Success", "FAILED", " success"] {
            assert_eq!(classify(status), StatusClass::Neutral, "status {status:?}");
        }
    }

    #[test]
    fn failure_does_not_stop_aggregation() {
        let report = ExecutionReport {
            execution_results: vec![
                ExecutionResult::new("create_dockerfile", "failed", "boom"),
                ExecutionResult::new("write_docker_compose", "success", "ok"),
                ExecutionResult::new("mystery", "skipped", "Unknown tool: mystery"),
                ExecutionResult::new("setup_ci_pipeline", "success", "ok"),
            ],
            files: Vec::new(),
        };

        let summary = report.summary();
        assert_eq!(summary.failure, 1);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.total(), 4);
        assert!(summary.has_failures());

        let tools: Vec<_> = report.classified().map(|(r, _)| r.tool.as_str()).collect();
        assert_eq!(
            tools,
            ["create_dockerfile", "write_docker_compose", "mystery", "setup_ci_pipeline"]
        );
    }

    #[test]
    fn empty_report_summary() {
        let summary = ExecutionReport::default().summary();
        assert_eq!(summary, ReportSummary::default());
        assert_eq!(summary.to_string(), "0 steps: 0 succeeded, 0 failed, 0 other");
    }

    proptest! {
        #[test]
        fn prop_classification_is_total(status in ".*") {
            let class = classify(&status);
            let expected = match status.as_str() {
                "success" => StatusClass::Success,
                "failed" => StatusClass::Failure,
                _ => StatusClass::Neutral,
            };
            prop_assert_eq!(class, expected);
        }

        #[test]
        fn prop_summary_counts_every_result(
            statuses in proptest::collection::vec(
                prop_oneof![Just("success".to_string()), Just("failed".to_string()), "[a-z]{0,8}"],
                0..40,
            )
        ) {
            let report = ExecutionReport {
                execution_results: statuses
                    .iter()
                    .map(|s| ExecutionResult::new("tool", s.clone(), ""))
                    .collect(),
                files: Vec::new(),
            };
            prop_assert_eq!(report.summary().total(), statuses.len());
        }
    }
}
