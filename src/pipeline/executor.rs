// src/pipeline/executor.rs

//! Pluggable task execution backend.
//!
//! The pipeline runner talks to a [`TaskExecutor`] instead of spawning
//! processes directly, so tests can substitute an executor that records
//! invocations and fabricates outcomes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::model::TodoScanConfig;
use crate::errors::Result;
use crate::tasks::invocation::{Invocation, TaskAction};
use crate::tasks::todo::run_todo_scan;
use crate::tasks::TaskId;

/// Result of one task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(i32), // exit code
}

/// Trait abstracting how a planned task action is carried out.
///
/// Production code uses [`ProcessExecutor`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait TaskExecutor: Send + Sync {
    fn execute(
        &self,
        task: TaskId,
        action: TaskAction,
    ) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>>;
}

/// Real executor: spawns the external tool and waits for it.
///
/// The tool runs with the project root as its working directory so that the
/// relative paths rendered into the invocation resolve correctly.
pub struct ProcessExecutor {
    root: PathBuf,
    todo: TodoScanConfig,
}

impl ProcessExecutor {
    pub fn new(root: impl Into<PathBuf>, todo: TodoScanConfig) -> Self {
        Self {
            root: root.into(),
            todo,
        }
    }

    async fn run_external(&self, task: TaskId, inv: Invocation) -> Result<TaskOutcome> {
        info!(task = %task, cmd = %inv.display_line(), "starting task process");

        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args)
            .current_dir(&self.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning '{}' for task '{task}'", inv.program))?;

        // Forward tool output line-by-line; diagnostics belong to the tool.
        if let Some(stdout) = child.stdout.take() {
            let task_name = task.name();
            tokio::spawn(async move {
                let reader = BufReader::new(stdout);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(task = %task_name, "stdout: {}", line);
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let task_name = task.name();
            tokio::spawn(async move {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(task = %task_name, "stderr: {}", line);
                }
            });
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for process of task '{task}'"))?;

        let code = status.code().unwrap_or(-1);
        info!(
            task = %task,
            exit_code = code,
            success = status.success(),
            "task process exited"
        );

        if status.success() {
            Ok(TaskOutcome::Success)
        } else {
            Ok(TaskOutcome::Failed(code))
        }
    }
}

impl TaskExecutor for ProcessExecutor {
    fn execute(
        &self,
        task: TaskId,
        action: TaskAction,
    ) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>> {
        Box::pin(async move {
            match action {
                TaskAction::External(inv) => self.run_external(task, inv).await,
                TaskAction::ScanTodos => {
                    run_todo_scan(&self.todo, &self.root)?;
                    Ok(TaskOutcome::Success)
                }
            }
        })
    }
}
