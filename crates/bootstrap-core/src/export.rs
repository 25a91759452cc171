//! Markdown report export
//!
//! Renders a stored plan (with the profile it was generated from) or an
//! execution report into a portable Markdown document. Rendering is a pure
//! function of its inputs; the generation time is passed in, never read from
//! the clock here.

use crate::status::classify;
use crate::types::{ExecutionPlan, ExecutionReport, ExecutionStep, RepositoryProfile};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Placeholder for missing profile fields
const UNKNOWN: &str = "Unknown";

/// Timestamp format in report headers
const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format in report filenames
const FILENAME_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Rendered report with its download name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// File name, e.g. `execution_plan_2026-10-19_14-03-22.md`
    pub filename: String,
    /// Markdown content
    pub content: String,
}

impl ReportDocument {
    /// Write the document into `dir` under its filename
    ///
    /// # Errors
    /// Any I/O error creating the directory or writing the file
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)?;
        tracing::info!(path = %path.display(), bytes = self.content.len(), "Report written");
        Ok(path)
    }
}

/// Filename of a plan report
#[inline]
#[must_use]
pub fn plan_filename(generated_at: NaiveDateTime) -> String {
    format!("execution_plan_{}.md", generated_at.format(FILENAME_TIME_FORMAT))
}

/// Filename of an execution results report
#[inline]
#[must_use]
pub fn results_filename(generated_at: NaiveDateTime) -> String {
    format!("execution_results_{}.md", generated_at.format(FILENAME_TIME_FORMAT))
}

/// Render a plan report
///
/// Steps appear exactly in plan order, numbered from 1. Optional lines are
/// omitted entirely when their value is missing or empty.
#[must_use]
pub fn export_plan(
    profile: Option<&RepositoryProfile>,
    plan: &ExecutionPlan,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = header("Execution Plan Report", generated_at);
    out.push_str("## Project Information\n\n");

    if let Some(profile) = profile.filter(|p| !p.is_empty()) {
        render_profile(&mut out, profile);
    }

    if !plan.is_empty() {
        out.push_str("## Execution Plan Steps\n\n");
        for (index, step) in plan.steps().iter().enumerate() {
            render_step(&mut out, index + 1, step);
        }
    }

    out
}

/// Render a plan report with its filename
#[inline]
#[must_use]
pub fn plan_report(
    profile: Option<&RepositoryProfile>,
    plan: &ExecutionPlan,
    generated_at: NaiveDateTime,
) -> ReportDocument {
    ReportDocument {
        filename: plan_filename(generated_at),
        content: export_plan(profile, plan, generated_at),
    }
}

/// Render an execution results report
///
/// One status entry per result in report order, then every generated file.
#[must_use]
pub fn export_results(report: &ExecutionReport, generated_at: NaiveDateTime) -> String {
    let mut out = header("Execution Results Report", generated_at);
    out.push_str("## Execution Summary\n\n");

    if !report.execution_results.is_empty() {
        out.push_str("### Execution Status\n\n");
        for result in &report.execution_results {
            let class = classify(&result.status);
            out.push_str(&format!(
                "- **{}**: {} {}\n",
                or_placeholder(&result.tool, UNKNOWN),
                class.marker(),
                or_placeholder(&result.status, "unknown"),
            ));
            if !result.details.is_empty() {
                out.push_str(&format!("  - Details: {}\n", result.details));
            }
            out.push('\n');
        }
    }

    if !report.files.is_empty() {
        out.push_str("## Generated Files\n\n");
        for file in &report.files {
            out.push_str(&format!("### {} - {}\n\n", file.tool, file.file_path));
            out.push_str(&format!("**File Path:** `{}`\n\n", file.file_path));
            out.push_str("**Content:**\n\n");
            out.push_str(&format!("```\n{}\n```\n\n", file.content));
            out.push_str("---\n\n");
        }
    }

    out
}

/// Render an execution results report with its filename
#[inline]
#[must_use]
pub fn results_report(report: &ExecutionReport, generated_at: NaiveDateTime) -> ReportDocument {
    ReportDocument {
        filename: results_filename(generated_at),
        content: export_results(report, generated_at),
    }
}

fn header(title: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "# {title}\n\nGenerated on: {}\n\n",
        generated_at.format(HEADER_TIME_FORMAT)
    )
}

fn render_profile(out: &mut String, profile: &RepositoryProfile) {
    let branch = profile.branch.as_deref().unwrap_or_default();

    out.push_str(&format!("**Repository:** {}\n", or_placeholder(&profile.repo_url, UNKNOWN)));
    out.push_str(&format!("**Branch:** {}\n", or_placeholder(branch, UNKNOWN)));
    out.push_str(&format!(
        "**Project Name:** {}\n\n",
        or_placeholder(&profile.project_name, UNKNOWN)
    ));

    if !profile.languages.is_empty() {
        out.push_str(&format!("**Languages:** {}\n", profile.languages.join(", ")));
    }
    if !profile.frameworks.is_empty() {
        out.push_str(&format!("**Frameworks:** {}\n", profile.frameworks.join(", ")));
    }
    if let Some(database) = profile.database.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("**Database:** {database}\n"));
    }
    out.push('\n');
}

fn render_step(out: &mut String, number: usize, step: &ExecutionStep) {
    out.push_str(&format!(
        "### Step {number}: {}\n\n",
        or_placeholder(&step.tool, "Unknown Tool")
    ));

    let file_path = step.args.file_path.as_deref().unwrap_or_default();
    out.push_str(&format!("**File Path:** `{}`\n\n", or_placeholder(file_path, "N/A")));

    if let Some(content) = non_empty(step.args.content.as_deref()) {
        out.push_str("**Generated Content:**\n\n");
        out.push_str(&format!("```\n{content}\n```\n\n"));
    }
    if let Some(check) = non_empty(step.success_check.as_deref()) {
        out.push_str(&format!("**Success Check:** {check}\n\n"));
    }
    if let Some(action) = non_empty(step.on_fail.as_deref()) {
        out.push_str(&format!("**On Failure:** {action}\n\n"));
    }

    out.push_str("---\n\n");
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExecutionResult, GeneratedFile};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 3, 22)
            .unwrap()
    }

    fn demo_profile() -> RepositoryProfile {
        RepositoryProfile::new("https://github.com/acme/demo", "main", "demo")
            .with_languages(["Python", "TypeScript"])
            .with_frameworks(["FastAPI"])
            .with_database("Postgres")
    }

    fn demo_plan() -> ExecutionPlan {
        ExecutionPlan::new().with_step(
            ExecutionStep::new("write_file")
                .with_file_path("README.md")
                .with_content("# Demo")
                .with_success_check("file exists")
                .with_on_fail("retry"),
        )
    }

    #[test]
    fn full_plan_report() {
        let text = export_plan(Some(&demo_profile()), &demo_plan(), at());

        let expected = "\
# Execution Plan Report

Generated on: 2026-10-19 14:03:22

## Project Information

**Repository:** https://github.com/acme/demo
**Branch:** main
**Project Name:** demo

**Languages:** Python, TypeScript
**Frameworks:** FastAPI
**Database:** Postgres

## Execution Plan Steps

### Step 1: write_file

**File Path:** `README.md`

**Generated Content:**

```
# Demo
```

**Success Check:** file exists

**On Failure:** retry

---

";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_sequences_omit_their_lines() {
        let profile = RepositoryProfile::new("https://github.com/acme/demo", "main", "demo");
        let text = export_plan(Some(&profile), &ExecutionPlan::new(), at());

        assert!(!text.contains("Languages:"));
        assert!(!text.contains("Frameworks:"));
        assert!(!text.contains("Database:"));
        assert!(!text.contains("## Execution Plan Steps"));
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let mut profile = RepositoryProfile::new("", "", "");
        profile.languages.push("Go".to_string());
        profile.branch = None;
        let plan = ExecutionPlan::new().with_step(ExecutionStep::new(""));

        let text = export_plan(Some(&profile), &plan, at());

        assert!(text.contains("**Repository:** Unknown\n"));
        assert!(text.contains("**Branch:** Unknown\n"));
        assert!(text.contains("**Project Name:** Unknown\n"));
        assert!(text.contains("### Step 1: Unknown Tool\n"));
        assert!(text.contains("**File Path:** `N/A`\n"));
    }

    #[test]
    fn step_without_content_has_no_fence() {
        let plan = ExecutionPlan::new()
            .with_step(ExecutionStep::new("deploy_to_cluster"))
            .with_step(ExecutionStep::new("write_file").with_content(""));

        let text = export_plan(None, &plan, at());

        assert!(!text.contains("```"));
        assert!(!text.contains("Generated Content"));
        assert!(!text.contains("Success Check"));
        assert!(!text.contains("On Failure"));
    }

    #[test]
    fn absent_or_empty_profile_skips_project_lines() {
        let with_none = export_plan(None, &demo_plan(), at());
        let with_empty = export_plan(Some(&RepositoryProfile::new("", "", "")), &demo_plan(), at());

        assert!(!with_none.contains("**Repository:**"));
        assert_eq!(with_none, with_empty);
    }

    #[test]
    fn steps_keep_plan_order() {
        let plan: ExecutionPlan = ["zeta", "alpha", "mid", "alpha"]
            .into_iter()
            .map(ExecutionStep::new)
            .collect();

        let text = export_plan(None, &plan, at());

        let positions: Vec<_> = [
            "### Step 1: zeta",
            "### Step 2: alpha",
            "### Step 3: mid",
            "### Step 4: alpha",
        ]
        .iter()
        .map(|h| text.find(h).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn export_is_deterministic() {
        let first = export_plan(Some(&demo_profile()), &demo_plan(), at());
        let second = export_plan(Some(&demo_profile()), &demo_plan(), at());
        assert_eq!(first, second);
    }

    #[test]
    fn filenames_use_second_granularity() {
        assert_eq!(plan_filename(at()), "execution_plan_2026-10-19_14-03-22.md");
        assert_eq!(results_filename(at()), "execution_results_2026-10-19_14-03-22.md");
        assert_eq!(plan_report(None, &ExecutionPlan::new(), at()).filename, plan_filename(at()));
    }

    #[test]
    fn results_report_lists_each_status_and_file() {
        let report = ExecutionReport {
            execution_results: vec![
                ExecutionResult::new("create_dockerfile", "success", "Dockerfile exists"),
                ExecutionResult::new("deploy_to_cluster", "failed", ""),
                ExecutionResult::new("mystery", "skipped", "Unknown tool: mystery"),
            ],
            files: vec![GeneratedFile {
                tool: "create_dockerfile".to_string(),
                file_path: "Dockerfile".to_string(),
                content: "FROM python:3.12".to_string(),
            }],
        };

        let text = export_results(&report, at());

        assert!(text.starts_with("# Execution Results Report\n\nGenerated on: 2026-10-19 14:03:22\n"));
        assert!(text.contains("## Execution Summary\n\n### Execution Status\n\n- **create_dockerfile**"));
        assert!(!text.contains("3 steps:"));
        assert!(text.contains("- **create_dockerfile**: ✅ success\n  - Details: Dockerfile exists\n"));
        assert!(text.contains("- **deploy_to_cluster**: ❌ failed\n\n"));
        assert!(text.contains("- **mystery**: ⚠️ skipped\n"));
        assert!(text.contains("### create_dockerfile - Dockerfile\n"));
        assert!(text.contains("```\nFROM python:3.12\n```\n"));
    }

    #[test]
    fn write_to_uses_filename() {
        let dir = tempfile::tempdir().unwrap();
        let doc = plan_report(Some(&demo_profile()), &demo_plan(), at());

        let path = doc.write_to(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("execution_plan_2026-10-19_14-03-22.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), doc.content);
    }
}
