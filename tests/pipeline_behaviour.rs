mod common;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use taskpipe::config::model::ConfigFile;
use taskpipe::errors::TaskpipeError;
use taskpipe::pipeline::runner::PipelineRunner;
use taskpipe::tasks::TaskId;

use common::RecordingExecutor;

type TestResult = Result<(), Box<dyn Error>>;

fn runner_with(
    cfg: ConfigFile,
    executor: Arc<RecordingExecutor>,
    root: &Path,
) -> PipelineRunner<RecordingExecutor> {
    PipelineRunner::new(Arc::new(cfg), root.to_path_buf(), executor)
}

#[tokio::test]
async fn default_pipeline_runs_tasks_in_declared_order() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let executor = Arc::new(RecordingExecutor::new());
    let runner = runner_with(ConfigFile::default(), Arc::clone(&executor), tmp.path());

    runner.run_pipeline("default").await?;

    assert_eq!(
        executor.executed(),
        vec![
            "style_compile",
            "vendor_prefix",
            "lint",
            "bundle_minify",
            "todo_scan"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn failure_skips_all_subsequent_tasks() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let executor = Arc::new(RecordingExecutor::failing_on(TaskId::Lint));
    let runner = runner_with(ConfigFile::default(), Arc::clone(&executor), tmp.path());

    let err = runner.run_pipeline("default").await.unwrap_err();

    match err {
        TaskpipeError::TaskFailed { task, code } => {
            assert_eq!(task, "lint");
            assert_eq!(code, 2);
        }
        other => panic!("expected TaskFailed, got {other}"),
    }

    // style_compile and vendor_prefix ran, lint ran and failed, the rest never ran.
    assert_eq!(
        executor.executed(),
        vec!["style_compile", "vendor_prefix", "lint"]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_pipeline_is_an_error_before_any_task_runs() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let executor = Arc::new(RecordingExecutor::new());
    let runner = runner_with(ConfigFile::default(), Arc::clone(&executor), tmp.path());

    let err = runner.run_pipeline("release").await.unwrap_err();
    assert!(matches!(err, TaskpipeError::UnknownPipeline(name) if name == "release"));
    assert!(executor.executed().is_empty());
    Ok(())
}

#[tokio::test]
async fn custom_pipeline_runs_only_its_own_tasks() -> TestResult {
    let tmp = tempfile::tempdir()?;

    let mut cfg = ConfigFile::default();
    cfg.pipelines.insert(
        "styles".to_string(),
        vec!["style_compile".to_string(), "vendor_prefix".to_string()],
    );

    let executor = Arc::new(RecordingExecutor::new());
    let runner = runner_with(cfg, Arc::clone(&executor), tmp.path());

    runner.run_pipeline("styles").await?;

    assert_eq!(
        executor.executed(),
        vec!["style_compile", "vendor_prefix"]
    );
    Ok(())
}
