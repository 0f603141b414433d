// src/tasks/mod.rs

//! The closed set of build tasks and how each one is carried out.
//!
//! Every task except the todo scanner delegates all real work to an external
//! command-line tool; [`invocation`] renders the typed config sections into
//! argv form. [`todo`] is the one native task: a todo-comment scanner.

pub mod invocation;
pub mod todo;

use std::fmt;

pub use invocation::{plan_task, Invocation, TaskAction};
pub use todo::{scan_todos, TodoItem};

/// Identifier for one of the five configured tasks.
///
/// The task set is closed: each variant corresponds to exactly one config
/// section, so task names are unique by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskId {
    StyleCompile,
    VendorPrefix,
    Lint,
    BundleMinify,
    TodoScan,
}

impl TaskId {
    /// All tasks, in the canonical `default` pipeline order.
    pub const ALL: [TaskId; 5] = [
        TaskId::StyleCompile,
        TaskId::VendorPrefix,
        TaskId::Lint,
        TaskId::BundleMinify,
        TaskId::TodoScan,
    ];

    /// The config-facing name of this task.
    pub fn name(self) -> &'static str {
        match self {
            TaskId::StyleCompile => "style_compile",
            TaskId::VendorPrefix => "vendor_prefix",
            TaskId::Lint => "lint",
            TaskId::BundleMinify => "bundle_minify",
            TaskId::TodoScan => "todo_scan",
        }
    }

    /// Resolve a config-facing name to a task id.
    pub fn parse(name: &str) -> Option<TaskId> {
        TaskId::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve an ordered list of task names into task ids.
///
/// Returns the first unknown name as `Err` so callers can report it.
pub fn resolve_names(names: &[String]) -> Result<Vec<TaskId>, String> {
    names
        .iter()
        .map(|n| TaskId::parse(n).ok_or_else(|| n.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for task in TaskId::ALL {
            assert_eq!(TaskId::parse(task.name()), Some(task));
        }
        assert_eq!(TaskId::parse("no_such_task"), None);
    }

    #[test]
    fn resolve_reports_first_unknown_name() {
        let names = vec!["lint".to_string(), "bogus".to_string()];
        assert_eq!(resolve_names(&names), Err("bogus".to_string()));
    }
}
