use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use taskpipe::errors::Result;
use taskpipe::pipeline::executor::{TaskExecutor, TaskOutcome};
use taskpipe::tasks::invocation::TaskAction;
use taskpipe::tasks::TaskId;

/// A fake executor that:
/// - records which tasks were "run", in order
/// - reports success for everything except an optional designated failure.
pub struct RecordingExecutor {
    executed: Arc<Mutex<Vec<String>>>,
    fail_on: Option<TaskId>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    pub fn failing_on(task: TaskId) -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_on: Some(task),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl TaskExecutor for RecordingExecutor {
    fn execute(
        &self,
        task: TaskId,
        _action: TaskAction,
    ) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>> {
        self.executed.lock().unwrap().push(task.name().to_string());

        let outcome = if self.fail_on == Some(task) {
            TaskOutcome::Failed(2)
        } else {
            TaskOutcome::Success
        };

        Box::pin(async move { Ok(outcome) })
    }
}
