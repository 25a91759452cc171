//! Property tests for the session store and exporter.

use bootstrap_core::{
    export_plan, ExecutionPlan, ExecutionReport, ExecutionResult, ExecutionStep, GeneratedFile,
    RepositoryProfile, SessionStore,
};
use bootstrap_test_utils::fixed_time;
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ./#-]{0,16}"
}

fn profile_strategy() -> impl Strategy<Value = RepositoryProfile> {
    (
        text(),
        proptest::option::of(text()),
        text(),
        proptest::collection::vec(text(), 0..4),
        proptest::collection::vec(text(), 0..4),
        proptest::option::of(text()),
        any::<bool>(),
    )
        .prop_map(|(repo_url, branch, project_name, languages, frameworks, database, has_tests)| {
            let mut profile = RepositoryProfile::new(repo_url, "", project_name)
                .with_languages(languages)
                .with_frameworks(frameworks);
            profile.branch = branch;
            profile.database = database;
            profile.has_tests = has_tests;
            profile
        })
}

fn step_strategy() -> impl Strategy<Value = ExecutionStep> {
    (
        "[a-z_]{1,12}",
        proptest::option::of(text()),
        proptest::option::of(text()),
        proptest::option::of(text()),
        proptest::option::of(text()),
    )
        .prop_map(|(tool, file_path, content, success_check, on_fail)| {
            let mut step = ExecutionStep::new(tool);
            step.args.file_path = file_path;
            step.args.content = content;
            step.success_check = success_check;
            step.on_fail = on_fail;
            step
        })
}

fn plan_strategy() -> impl Strategy<Value = ExecutionPlan> {
    proptest::collection::vec(step_strategy(), 0..8).prop_map(ExecutionPlan::from)
}

fn report_strategy() -> impl Strategy<Value = ExecutionReport> {
    (
        proptest::collection::vec((text(), text(), text()), 0..8),
        proptest::collection::vec((text(), text(), text()), 0..4),
    )
        .prop_map(|(results, files)| ExecutionReport {
            execution_results: results
                .into_iter()
                .map(|(tool, status, details)| ExecutionResult::new(tool, status, details))
                .collect(),
            files: files
                .into_iter()
                .map(|(tool, file_path, content)| GeneratedFile {
                    tool,
                    file_path,
                    content,
                })
                .collect(),
        })
}

proptest! {
    #[test]
    fn prop_profile_round_trips(profile in profile_strategy()) {
        let mut store = SessionStore::in_memory();
        store.put_profile(&profile).unwrap();
        prop_assert_eq!(store.profile(), Some(profile));
    }

    #[test]
    fn prop_plan_round_trips(plan in plan_strategy()) {
        let mut store = SessionStore::in_memory();
        store.put_plan(&plan).unwrap();
        prop_assert_eq!(store.plan(), Some(plan));
    }

    #[test]
    fn prop_report_round_trips_through_files(report in report_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(dir.path());
        store.put_report(&report).unwrap();
        prop_assert_eq!(SessionStore::open(dir.path()).report(), Some(report));
    }

    #[test]
    fn prop_export_keeps_step_order(plan in plan_strategy()) {
        let text = export_plan(None, &plan, fixed_time());

        let mut cursor = 0;
        for (index, step) in plan.steps().iter().enumerate() {
            let heading = format!("### Step {}: {}\n", index + 1, step.tool);
            let found = text[cursor..].find(&heading);
            prop_assert!(found.is_some(), "missing {:?}", heading);
            cursor += found.unwrap() + heading.len();
        }
        let past_end = format!("### Step {}: ", plan.len() + 1);
        prop_assert!(!text.contains(&past_end));
    }

    #[test]
    fn prop_no_empty_fences(plan in plan_strategy()) {
        let text = export_plan(None, &plan, fixed_time());
        let with_content = plan
            .steps()
            .iter()
            .filter(|s| s.args.content.as_deref().is_some_and(|c| !c.is_empty()))
            .count();
        prop_assert_eq!(text.matches("**Generated Content:**").count(), with_content);
    }
}
