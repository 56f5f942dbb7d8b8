use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagecraft::error::WorkspaceError;
use pagecraft::generation::{CommandRunner, GenerationOrchestrator, WorkerPool};
use pagecraft::models::*;
use pagecraft::platform::PlatformAdapter;
use pagecraft::store::{ProjectStore, PromptLedger};
use tempfile::TempDir;

/// Stub generator that writes `index.html` into the working directory.
struct WritesPage;

impl CommandRunner for WritesPage {
    fn run(&self, _command: &str, working_dir: &Path) -> String {
        fs::write(working_dir.join(ARTIFACT_FILE), "<html>generated</html>")
            .expect("Failed to write page");
        "wrote index.html".to_string()
    }
}

/// Stub generator that only prints.
struct PrintsOnly;

impl CommandRunner for PrintsOnly {
    fn run(&self, _command: &str, _working_dir: &Path) -> String {
        "model refused".to_string()
    }
}

/// Stub generator that remembers what it was asked to run.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl CommandRunner for Recorder {
    fn run(&self, command: &str, working_dir: &Path) -> String {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), working_dir.to_path_buf()));
        String::new()
    }
}

/// Stub generator that renames the project while it runs, then writes the
/// page into the directory's new location.
struct RenamesMidRun {
    store: ProjectStore,
}

impl CommandRunner for RenamesMidRun {
    fn run(&self, _command: &str, working_dir: &Path) -> String {
        self.store.rename("demo", "demo2").expect("Failed to rename");
        let moved = working_dir.with_file_name("demo2");
        fs::write(moved.join(ARTIFACT_FILE), "<html>moved</html>").expect("Failed to write page");
        "renamed".to_string()
    }
}

fn setup(runner: Arc<dyn CommandRunner>) -> (TempDir, ProjectStore, GenerationOrchestrator) {
    setup_with_tool(runner, "pagecraft-test-generator")
}

fn setup_with_tool(
    runner: Arc<dyn CommandRunner>,
    tool: &str,
) -> (TempDir, ProjectStore, GenerationOrchestrator) {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let store = ProjectStore::new(Some(temp.path().to_path_buf()));
    let platform = Arc::new(PlatformAdapter::new(Duration::from_secs(5)));
    let generator =
        GenerationOrchestrator::new(store.clone(), platform, WorkerPool::new(runner, 2), tool);
    (temp, store, generator)
}

#[tokio::test]
async fn successful_run_records_the_prompt() {
    let (temp, store, generator) = setup(Arc::new(WritesPage));
    store.create("demo").unwrap();
    let selection = store.select("demo").unwrap();
    assert!(!selection.has_artifact);

    let outcome = generator.generate("make a login page").await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.artifact_url.as_deref(), Some("/api/html"));
    assert_eq!(outcome.raw_output, "wrote index.html");
    assert!(outcome.warnings.is_empty());

    let ledger = PromptLedger::read(&temp.path().join("demo")).unwrap();
    assert_eq!(ledger.len(), 1);
    assert!(ledger[0].starts_with("1 ["));
    assert!(ledger[0].ends_with("make a login page"));
}

#[tokio::test]
async fn run_without_page_fails_and_leaves_ledger_untouched() {
    let (temp, store, generator) = setup(Arc::new(PrintsOnly));
    store.create("demo").unwrap();
    store.select("demo").unwrap();

    let outcome = generator.generate("make a login page").await.unwrap();

    assert!(!outcome.success);
    assert!(outcome.artifact_url.is_none());
    assert_eq!(outcome.raw_output, "model refused");
    assert!(!temp.path().join("demo").join(LEDGER_FILE).exists());
}

#[tokio::test]
async fn generation_requires_a_session() {
    let (_temp, _store, generator) = setup(Arc::new(WritesPage));

    let result = generator.generate("anything").await;

    assert!(matches!(result, Err(WorkspaceError::SessionRequired)));
}

#[tokio::test]
async fn deleting_the_active_project_ends_generation() {
    let (_temp, store, generator) = setup(Arc::new(WritesPage));
    store.create("demo").unwrap();
    store.select("demo").unwrap();
    store.delete("demo").unwrap();

    let result = generator.generate("make a login page").await;

    assert!(matches!(result, Err(WorkspaceError::SessionRequired)));
}

#[tokio::test]
async fn runs_in_the_active_project_directory() {
    let recorder = Arc::new(Recorder::default());
    let (temp, store, generator) = setup(recorder.clone());
    store.create("demo").unwrap();
    store.select("demo").unwrap();
    store.rename("demo", "demo2").unwrap();

    generator.generate(r#"a "quoted" title"#).await.unwrap();

    let calls = recorder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (command, dir) = &calls[0];
    assert_eq!(dir, &temp.path().join("demo2"));
    assert!(command.starts_with("pagecraft-test-generator run \""));
    assert!(command.contains(r#"a \"quoted\" title"#));
}

#[tokio::test]
async fn ledger_failure_does_not_mask_success() {
    let (temp, store, generator) = setup(Arc::new(WritesPage));
    store.create("demo").unwrap();
    store.select("demo").unwrap();
    fs::create_dir(temp.path().join("demo").join(LEDGER_FILE)).unwrap();

    let outcome = generator.generate("make a login page").await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].starts_with("Prompt history not updated"));
}

#[tokio::test]
async fn stale_page_still_counts_as_success_with_a_warning() {
    let (temp, store, generator) = setup(Arc::new(PrintsOnly));
    store.create("demo").unwrap();
    store.select("demo").unwrap();
    fs::write(temp.path().join("demo").join(ARTIFACT_FILE), "<html>old</html>").unwrap();

    let outcome = generator.generate("tweak it").await.unwrap();

    assert!(outcome.success);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("was not modified by this run")));
    assert_eq!(PromptLedger::read(&temp.path().join("demo")).unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_runs_number_the_ledger_in_order() {
    let (temp, store, generator) = setup(Arc::new(WritesPage));
    store.create("demo").unwrap();
    store.select("demo").unwrap();

    for prompt in ["one", "two", "three"] {
        assert!(generator.generate(prompt).await.unwrap().success);
    }

    let records: Vec<_> = PromptLedger::read(&temp.path().join("demo"))
        .unwrap()
        .iter()
        .map(|line| PromptRecord::parse(line).unwrap())
        .collect();
    let sequences: Vec<_> = records.iter().map(|r| r.sequence).collect();
    let texts: Vec<_> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn rename_during_a_run_checks_the_new_directory() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let store = ProjectStore::new(Some(temp.path().to_path_buf()));
    let runner = Arc::new(RenamesMidRun {
        store: store.clone(),
    });
    let generator = GenerationOrchestrator::new(
        store.clone(),
        Arc::new(PlatformAdapter::new(Duration::from_secs(5))),
        WorkerPool::new(runner, 1),
        "pagecraft-test-generator",
    );
    store.create("demo").unwrap();
    store.select("demo").unwrap();

    let outcome = generator.generate("make a login page").await.unwrap();

    assert!(outcome.success);
    assert_eq!(store.active().unwrap().name, "demo2");
    let ledger = PromptLedger::read(&temp.path().join("demo2")).unwrap();
    assert_eq!(ledger.len(), 1);
    assert!(ledger[0].ends_with("make a login page"));
}

#[cfg(unix)]
#[tokio::test]
async fn real_executor_runs_a_tool_under_a_path_with_spaces() {
    use std::os::unix::fs::PermissionsExt;

    use pagecraft::generation::ProcessExecutor;
    use pagecraft::platform::Shell;

    let tool_dir = tempfile::Builder::new()
        .prefix("tool dir ")
        .tempdir()
        .expect("Failed to create tool dir");
    let tool = tool_dir.path().join("fakegen");
    fs::write(&tool, "#!/bin/sh\necho '<html>real</html>' > index.html\necho generated\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let (temp, store, generator) = setup_with_tool(
        Arc::new(ProcessExecutor::new(Shell::Posix)),
        tool.to_str().unwrap(),
    );
    store.create("demo").unwrap();
    store.select("demo").unwrap();

    let outcome = generator.generate("hi").await.unwrap();

    assert!(outcome.success, "output: {}", outcome.raw_output);
    assert_eq!(outcome.raw_output.trim(), "generated");
    assert!(temp.path().join("demo").join(ARTIFACT_FILE).is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn real_executor_reports_launch_failures_as_text() {
    use pagecraft::generation::ProcessExecutor;
    use pagecraft::platform::Shell;

    let (temp, store, generator) = setup(Arc::new(ProcessExecutor::new(Shell::Posix)));
    store.create("demo").unwrap();
    store.select("demo").unwrap();
    // Pull the directory out from under the session so the launch fails.
    fs::remove_dir(temp.path().join("demo")).unwrap();

    let outcome = generator.generate("anything").await.unwrap();

    assert!(!outcome.success);
    assert!(outcome.raw_output.starts_with("Error: "));
}
