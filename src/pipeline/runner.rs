// src/pipeline/runner.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::model::ConfigFile;
use crate::errors::{Result, TaskpipeError};
use crate::pipeline::executor::{TaskExecutor, TaskOutcome};
use crate::tasks::invocation::plan_task;
use crate::tasks::{resolve_names, TaskId};

/// Executes pipelines: ordered task lists, sequentially, aborting on the
/// first failure.
///
/// The runner is cheap to clone (config and executor are shared), which is
/// how independent watch rules run their pipelines concurrently.
pub struct PipelineRunner<E> {
    cfg: Arc<ConfigFile>,
    root: PathBuf,
    executor: Arc<E>,
}

impl<E> Clone for PipelineRunner<E> {
    fn clone(&self) -> Self {
        Self {
            cfg: Arc::clone(&self.cfg),
            root: self.root.clone(),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E: TaskExecutor> PipelineRunner<E> {
    pub fn new(cfg: Arc<ConfigFile>, root: impl Into<PathBuf>, executor: Arc<E>) -> Self {
        Self {
            cfg,
            root: root.into(),
            executor,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.cfg
    }

    /// Run a named pipeline from `[pipelines]`.
    pub async fn run_pipeline(&self, name: &str) -> Result<()> {
        let tasks = self
            .cfg
            .pipelines
            .get(name)
            .ok_or_else(|| TaskpipeError::UnknownPipeline(name.to_string()))?;

        let ids = resolve_names(tasks).map_err(|unknown| {
            TaskpipeError::ConfigError(format!(
                "pipeline '{name}' references unknown task '{unknown}'"
            ))
        })?;

        info!(pipeline = %name, tasks = ?tasks, "running pipeline");
        self.run_tasks(&ids).await
    }

    /// Run an explicit ordered task list (watch rules use this directly).
    ///
    /// Tasks run strictly one after another; the first failure aborts the
    /// remainder and is returned as [`TaskpipeError::TaskFailed`].
    pub async fn run_tasks(&self, tasks: &[TaskId]) -> Result<()> {
        for &task in tasks {
            let action = plan_task(task, &self.cfg, &self.root)?;

            match self.executor.execute(task, action).await? {
                TaskOutcome::Success => {}
                TaskOutcome::Failed(code) => {
                    warn!(task = %task, exit_code = code, "task failed; aborting pipeline");
                    return Err(TaskpipeError::TaskFailed {
                        task: task.name().to_string(),
                        code,
                    });
                }
            }
        }
        Ok(())
    }
}
