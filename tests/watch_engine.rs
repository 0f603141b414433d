mod common;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use taskpipe::config::model::{ConfigFile, WatchRuleConfig};
use taskpipe::engine::{RuntimeEvent, WatchEngine};
use taskpipe::pipeline::runner::PipelineRunner;
use taskpipe::watch::compile_rules;

use common::RecordingExecutor;

type TestResult = Result<(), Box<dyn Error>>;

fn rule(name: &str, globs: &[&str], tasks: &[&str]) -> WatchRuleConfig {
    WatchRuleConfig {
        name: name.to_string(),
        globs: globs.iter().map(|s| s.to_string()).collect(),
        exclude: vec![],
        globs_from: None,
        tasks: tasks.iter().map(|s| s.to_string()).collect(),
        live_reload: false,
    }
}

fn two_rule_config() -> ConfigFile {
    let mut cfg = ConfigFile::default();
    cfg.watch.push(rule(
        "styles",
        &["app/less/**/*.less"],
        &["style_compile", "vendor_prefix"],
    ));
    cfg.watch.push(rule(
        "scripts",
        &["app/js/**/*.js"],
        &["lint", "bundle_minify"],
    ));
    cfg
}

/// Poll until the executor has recorded `expected` task runs.
async fn wait_for_runs(executor: &RecordingExecutor, expected: usize) -> TestResult {
    timeout(Duration::from_secs(2), async {
        while executor.executed().len() < expected {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    Ok(())
}

struct EngineUnderTest {
    executor: Arc<RecordingExecutor>,
    events_tx: mpsc::Sender<RuntimeEvent>,
    handle: tokio::task::JoinHandle<taskpipe::errors::Result<()>>,
    root: PathBuf,
}

fn start_engine(cfg: ConfigFile, reload_hook: Option<String>) -> EngineUnderTest {
    let tmp = tempfile::tempdir().unwrap();
    // Keep the directory alive for the whole test process; the engine only
    // needs the path for prefix-stripping, never for IO.
    let root = tmp.keep().canonicalize().unwrap();

    let cfg = Arc::new(cfg);
    let rules = compile_rules(&cfg).unwrap();
    let executor = Arc::new(RecordingExecutor::new());
    let runner = PipelineRunner::new(Arc::clone(&cfg), root.clone(), Arc::clone(&executor));

    let (events_tx, events_rx) = mpsc::channel(64);
    let engine = WatchEngine::new(
        runner,
        rules,
        root.clone(),
        reload_hook,
        events_rx,
        events_tx.clone(),
    );
    let handle = tokio::spawn(engine.run());

    EngineUnderTest {
        executor,
        events_tx,
        handle,
        root,
    }
}

#[tokio::test]
async fn matching_rule_runs_its_pipeline_and_nothing_else() -> TestResult {
    let engine = start_engine(two_rule_config(), None);

    engine
        .events_tx
        .send(RuntimeEvent::PathsChanged(vec![
            engine.root.join("app/less/main.less"),
        ]))
        .await?;

    wait_for_runs(&engine.executor, 2).await?;
    assert_eq!(engine.executor.executed(), vec!["style_compile", "vendor_prefix"]);

    engine.events_tx.send(RuntimeEvent::ShutdownRequested).await?;
    engine.handle.await??;
    Ok(())
}

#[tokio::test]
async fn non_matching_path_runs_nothing() -> TestResult {
    let engine = start_engine(two_rule_config(), None);

    engine
        .events_tx
        .send(RuntimeEvent::PathsChanged(vec![
            engine.root.join("README.md"),
        ]))
        .await?;

    // Give the engine a moment to (not) react.
    sleep(Duration::from_millis(100)).await;
    assert!(engine.executor.executed().is_empty());

    engine.events_tx.send(RuntimeEvent::ShutdownRequested).await?;
    engine.handle.await??;
    Ok(())
}

#[tokio::test]
async fn disjoint_rules_firing_together_both_run() -> TestResult {
    let engine = start_engine(two_rule_config(), None);

    engine
        .events_tx
        .send(RuntimeEvent::PathsChanged(vec![
            engine.root.join("app/less/main.less"),
            engine.root.join("app/js/app.js"),
        ]))
        .await?;

    wait_for_runs(&engine.executor, 4).await?;

    // Both pipelines ran; order between rules is unspecified, but order
    // within each rule is preserved.
    let executed = engine.executor.executed();
    let pos = |name: &str| executed.iter().position(|t| t == name).unwrap();
    assert!(pos("style_compile") < pos("vendor_prefix"));
    assert!(pos("lint") < pos("bundle_minify"));
    assert_eq!(executed.len(), 4);

    engine.events_tx.send(RuntimeEvent::ShutdownRequested).await?;
    engine.handle.await??;
    Ok(())
}

#[tokio::test]
async fn server_settled_fires_the_reload_hook() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let marker = tmp.path().join("reloaded");
    let hook = format!("touch {}", marker.display());

    let engine = start_engine(two_rule_config(), Some(hook));

    engine.events_tx.send(RuntimeEvent::ServerSettled).await?;

    timeout(Duration::from_secs(2), async {
        while !marker.exists() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await?;

    engine.events_tx.send(RuntimeEvent::ShutdownRequested).await?;
    engine.handle.await??;
    Ok(())
}

#[tokio::test]
async fn live_reload_rule_fires_hook_after_success() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let marker = tmp.path().join("reloaded");
    let hook = format!("touch {}", marker.display());

    let mut cfg = ConfigFile::default();
    let mut styles = rule("styles", &["app/less/**/*.less"], &["style_compile"]);
    styles.live_reload = true;
    cfg.watch.push(styles);

    let engine = start_engine(cfg, Some(hook));

    engine
        .events_tx
        .send(RuntimeEvent::PathsChanged(vec![
            engine.root.join("app/less/main.less"),
        ]))
        .await?;

    timeout(Duration::from_secs(2), async {
        while !marker.exists() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await?;
    assert_eq!(engine.executor.executed(), vec!["style_compile"]);

    engine.events_tx.send(RuntimeEvent::ShutdownRequested).await?;
    engine.handle.await??;
    Ok(())
}
