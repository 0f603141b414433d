// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod tasks;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{RuntimeEvent, WatchEngine};
use crate::errors::Result;
use crate::pipeline::executor::ProcessExecutor;
use crate::pipeline::runner::PipelineRunner;
use crate::serve::Supervisor;
use crate::tasks::invocation::{plan_task, TaskAction};
use crate::tasks::resolve_names;
use crate::watch::{compile_rules, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the pipeline runner and process executor
/// - (for watch/serve) the file watcher, engine loop and supervisor
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = Arc::new(load_and_validate(&config_path)?);
    let root = config_root_dir(&config_path);

    match args.command {
        CliCommand::Run { pipeline, dry_run } => {
            if dry_run {
                print_dry_run(&cfg, &pipeline, &root)?;
                return Ok(());
            }
            let runner = make_runner(&cfg, &root);
            runner.run_pipeline(&pipeline).await
        }
        CliCommand::Watch => watch_mode(cfg, root).await,
        CliCommand::Serve => serve_mode(cfg, root).await,
    }
}

fn make_runner(cfg: &Arc<ConfigFile>, root: &Path) -> PipelineRunner<ProcessExecutor> {
    let executor = Arc::new(ProcessExecutor::new(
        root.to_path_buf(),
        cfg.todo_scan.clone(),
    ));
    PipelineRunner::new(Arc::clone(cfg), root.to_path_buf(), executor)
}

/// Watch-only mode: rule matching and pipeline re-runs, no server.
async fn watch_mode(cfg: Arc<ConfigFile>, root: PathBuf) -> Result<()> {
    let runner = make_runner(&cfg, &root);
    let rules = compile_rules(&cfg)?;

    let (events_tx, events_rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher_handle = spawn_watcher(root.clone(), events_tx.clone())?;

    spawn_ctrl_c(events_tx.clone());

    let engine = WatchEngine::new(
        runner,
        rules,
        root,
        cfg.server.on_reload.clone(),
        events_rx,
        events_tx,
    );
    engine.run().await
}

/// Serve mode: the supervisor and the watch engine run concurrently,
/// sharing one event channel.
async fn serve_mode(cfg: Arc<ConfigFile>, root: PathBuf) -> Result<()> {
    let runner = make_runner(&cfg, &root);
    let rules = compile_rules(&cfg)?;

    let (events_tx, events_rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher_handle = spawn_watcher(root.clone(), events_tx.clone())?;

    // The supervisor gets its own watcher stream: it filters by backend
    // extension, independent of the frontend watch rules.
    let (backend_tx, backend_rx) = mpsc::channel::<RuntimeEvent>(64);
    let _backend_watcher_handle = spawn_watcher(root.clone(), backend_tx)?;

    let supervisor = Supervisor::new(
        cfg.server.clone(),
        root.clone(),
        backend_rx,
        events_tx.clone(),
    );
    tokio::spawn(async move {
        if let Err(err) = supervisor.run().await {
            error!(error = %err, "supervisor stopped with error");
        }
    });

    spawn_ctrl_c(events_tx.clone());

    let engine = WatchEngine::new(
        runner,
        rules,
        root,
        cfg.server.on_reload.clone(),
        events_rx,
        events_tx,
    );
    engine.run().await
}

/// Ctrl-C → graceful shutdown of the engine loop.
fn spawn_ctrl_c(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

/// Figure out a sensible project root.
/// Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Dry-run output: print the pipeline's tasks and their rendered commands.
fn print_dry_run(cfg: &ConfigFile, pipeline: &str, root: &Path) -> Result<()> {
    let tasks = cfg
        .pipelines
        .get(pipeline)
        .ok_or_else(|| errors::TaskpipeError::UnknownPipeline(pipeline.to_string()))?;
    let ids = resolve_names(tasks).map_err(|unknown| {
        errors::TaskpipeError::ConfigError(format!(
            "pipeline '{pipeline}' references unknown task '{unknown}'"
        ))
    })?;

    println!("taskpipe dry-run: pipeline '{pipeline}'");
    for task in ids {
        match plan_task(task, cfg, root)? {
            TaskAction::External(inv) => {
                println!("  - {task}: {}", inv.display_line());
            }
            TaskAction::ScanTodos => {
                println!(
                    "  - {task}: scan {:?} -> {}",
                    cfg.todo_scan.include, cfg.todo_scan.output
                );
            }
        }
    }

    info!(pipeline = %pipeline, "dry-run complete (no execution)");
    debug!(?tasks, "dry-run task list");
    Ok(())
}
