//! Subcommand handlers
//!
//! One handler per user action. Handlers take the session store explicitly
//! and write human-readable output to the given writer.

use anyhow::{Context, Result};
use bootstrap_core::{
    plan_report, results_report, ExecutionPlan, ExecutionReport, Pipeline, PipelineService,
    RepositoryProfile, ScanRequest, SessionStore, Slot,
};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;

pub(crate) async fn scan<S: PipelineService>(
    pipeline: &Pipeline<S>,
    store: &mut SessionStore,
    request: ScanRequest,
    out: &mut impl Write,
) -> Result<()> {
    let profile = pipeline.scan(store, request).await?;
    print_profile(&profile, out)?;
    writeln!(out, "\nNext: run `plan` to generate an execution plan.")?;
    Ok(())
}

pub(crate) async fn plan<S: PipelineService>(
    pipeline: &Pipeline<S>,
    store: &mut SessionStore,
    out: &mut impl Write,
) -> Result<()> {
    let plan = pipeline.plan(store).await?;
    print_plan(&plan, out)?;
    writeln!(out, "\nNext: run `execute` to run the plan, or `export` to save it.")?;
    Ok(())
}

pub(crate) async fn execute<S: PipelineService>(
    pipeline: &Pipeline<S>,
    store: &mut SessionStore,
    out: &mut impl Write,
) -> Result<()> {
    let report = pipeline.execute(store).await?;
    print_report(&report, out)
}

pub(crate) fn export(
    store: &SessionStore,
    dir: &Path,
    generated_at: NaiveDateTime,
    out: &mut impl Write,
) -> Result<()> {
    let plan = store.plan().with_context(|| missing(Slot::Plan))?;
    let profile = store.profile();

    let path = plan_report(profile.as_ref(), &plan, generated_at)
        .write_to(dir)
        .with_context(|| format!("failed to write plan report into {}", dir.display()))?;
    writeln!(out, "Plan report written to {}", path.display())?;
    Ok(())
}

pub(crate) fn results(
    store: &SessionStore,
    export_to: Option<&Path>,
    generated_at: NaiveDateTime,
    out: &mut impl Write,
) -> Result<()> {
    let report = store.report().with_context(|| missing(Slot::Execution))?;
    print_report(&report, out)?;

    if let Some(dir) = export_to {
        let path = results_report(&report, generated_at)
            .write_to(dir)
            .with_context(|| format!("failed to write results report into {}", dir.display()))?;
        writeln!(out, "\nResults report written to {}", path.display())?;
    }
    Ok(())
}

pub(crate) fn status(store: &SessionStore, out: &mut impl Write) -> Result<()> {
    for slot in Slot::ALL {
        let state = if store.is_present(slot) { "present" } else { "absent" };
        writeln!(out, "{:<10} {state}", slot.key())?;
    }
    match store.resume_point() {
        Some(stage) => writeln!(out, "\nNext stage: {stage}")?,
        None => writeln!(out, "\nPipeline complete.")?,
    }
    Ok(())
}

/// Remove the session slots; other files in the session directory stay
pub(crate) fn reset(store: &mut SessionStore, out: &mut impl Write) -> Result<()> {
    store.clear().context("failed to clear session")?;
    writeln!(out, "Session cleared.")?;
    Ok(())
}

fn missing(slot: Slot) -> String {
    format!("no {slot} data in session, run `{}` first", slot.owner())
}

fn print_profile(profile: &RepositoryProfile, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Project:    {}", profile.project_name)?;
    writeln!(out, "Repository: {}", profile.repo_url)?;
    writeln!(out, "Branch:     {}", profile.branch.as_deref().unwrap_or("-"))?;
    writeln!(out, "Languages:  {}", join_or_dash(&profile.languages))?;
    writeln!(out, "Frameworks: {}", join_or_dash(&profile.frameworks))?;
    writeln!(out, "Database:   {}", profile.database.as_deref().unwrap_or("-"))?;
    if let Some(note) = &profile.note {
        writeln!(out, "Note:       {note}")?;
    }
    Ok(())
}

fn print_plan(plan: &ExecutionPlan, out: &mut impl Write) -> Result<()> {
    if plan.is_empty() {
        writeln!(out, "Plan has no steps.")?;
        return Ok(());
    }
    for (index, step) in plan.steps().iter().enumerate() {
        match step.args.file_path.as_deref() {
            Some(path) => writeln!(out, "{:>3}. {} ({path})", index + 1, step.tool)?,
            None => writeln!(out, "{:>3}. {}", index + 1, step.tool)?,
        }
    }
    Ok(())
}

fn print_report(report: &ExecutionReport, out: &mut impl Write) -> Result<()> {
    for (result, class) in report.classified() {
        writeln!(out, "{} {}: {}", class.marker(), result.tool, result.status)?;
        if !result.details.is_empty() {
            writeln!(out, "     {}", result.details)?;
        }
    }
    writeln!(out, "\n{}", report.summary())?;

    if report.files.is_empty() {
        writeln!(out, "No generated files.")?;
    } else {
        writeln!(out, "Generated files:")?;
        for file in &report.files {
            writeln!(out, "  {} ({})", file.file_path, file.tool)?;
        }
    }
    Ok(())
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_test_utils::{container_plan, demo_profile, fixed_time, FakePipelineService};

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn scan_then_plan_prints_steps() {
        let pipeline = Pipeline::new(FakePipelineService::new(demo_profile(), container_plan()));
        let mut store = SessionStore::in_memory();
        let mut buf = Vec::new();

        scan(
            &pipeline,
            &mut store,
            ScanRequest::new("https://github.com/acme/demo", "main"),
            &mut buf,
        )
        .await
        .unwrap();
        plan(&pipeline, &mut store, &mut buf).await.unwrap();

        let text = output(buf);
        assert!(text.contains("Languages:  Python, TypeScript"));
        assert!(text.contains("  1. create_dockerfile (Dockerfile)"));
        assert!(text.contains("  3. deploy_to_cluster\n"));
    }

    #[tokio::test]
    async fn execute_prints_markers_and_summary() {
        let pipeline = Pipeline::new(FakePipelineService::new(demo_profile(), container_plan()));
        let mut store = SessionStore::in_memory();
        store.put_plan(&container_plan()).unwrap();
        let mut buf = Vec::new();

        execute(&pipeline, &mut store, &mut buf).await.unwrap();

        let text = output(buf);
        assert!(text.contains("✅ create_dockerfile: success"));
        assert!(text.contains("3 steps: 3 succeeded, 0 failed, 0 other"));
        assert!(text.contains("  Dockerfile (create_dockerfile)"));
    }

    #[test]
    fn export_requires_plan() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_memory();

        let err = export(&store, dir.path(), fixed_time(), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("run `plan` first"));
    }

    #[test]
    fn export_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::in_memory();
        store.put_profile(&demo_profile()).unwrap();
        store.put_plan(&container_plan()).unwrap();

        export(&store, dir.path(), fixed_time(), &mut Vec::new()).unwrap();

        let written = dir.path().join("execution_plan_2026-10-19_14-03-22.md");
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("### Step 2: write_docker_compose"));
    }

    #[test]
    fn status_reports_resume_point() {
        let mut store = SessionStore::in_memory();
        store.put_profile(&demo_profile()).unwrap();
        let mut buf = Vec::new();

        status(&store, &mut buf).unwrap();

        let text = output(buf);
        assert!(text.contains("scan       present"));
        assert!(text.contains("plan       absent"));
        assert!(text.contains("Next stage: plan"));
    }

    #[test]
    fn reset_removes_dedicated_session_directory() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session");
        let mut store = SessionStore::open(&session);
        store.put_profile(&demo_profile()).unwrap();

        reset(&mut store, &mut Vec::new()).unwrap();

        assert!(!session.exists());
        assert!(SessionStore::open(&session).profile().is_none());
    }

    #[test]
    fn reset_in_project_directory_keeps_project_files() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("my-project");
        std::fs::create_dir_all(project.join("src")).unwrap();
        std::fs::write(project.join("src/main.rs"), "fn main() {}").unwrap();
        let mut store = SessionStore::open(&project);
        store.put_profile(&demo_profile()).unwrap();
        store.put_plan(&container_plan()).unwrap();
        let mut buf = Vec::new();

        reset(&mut store, &mut buf).unwrap();

        assert_eq!(output(buf), "Session cleared.\n");
        assert!(project.join("src/main.rs").exists());
        assert!(!project.join("scan.json").exists());
        assert!(!project.join("plan.json").exists());
        assert!(SessionStore::open(&project).plan().is_none());
    }
}
