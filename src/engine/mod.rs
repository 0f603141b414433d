// src/engine/mod.rs

//! Orchestration engine for watch and serve modes.
//!
//! The engine consumes a single stream of [`RuntimeEvent`]s produced by:
//! - the filesystem watcher (changed paths)
//! - per-rule pipeline runs it spawned itself (completions)
//! - the dev-server supervisor (settle notifications)
//! - the Ctrl-C handler (shutdown)
//!
//! and reacts by matching watch rules, running their pipelines, and issuing
//! browser-reload notifications.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::pipeline::executor::TaskExecutor;
use crate::pipeline::runner::PipelineRunner;
use crate::watch::rules::WatchRule;

/// Events flowing into the engine loop.
///
/// Rules fire independently of each other; the only ordering the engine
/// guarantees is within a single rule's pipeline.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// Changed paths reported by the filesystem watcher (absolute).
    PathsChanged(Vec<PathBuf>),
    /// A spawned watch-rule pipeline finished.
    RuleFinished { rule: usize, ok: bool },
    /// The supervised dev server (re)started and its settle delay elapsed.
    ServerSettled,
    /// Ctrl-C (or equivalent) was received.
    ShutdownRequested,
}

/// Per-rule dispatch state.
///
/// While a rule's pipeline is running, further triggers for the same rule
/// coalesce into a single pending re-run instead of piling up.
#[derive(Debug, Default, Clone, Copy)]
struct RuleState {
    running: bool,
    pending: bool,
}

/// The watch/serve event loop.
pub struct WatchEngine<E> {
    runner: PipelineRunner<E>,
    rules: Arc<Vec<WatchRule>>,
    root: PathBuf,
    reload_hook: Option<String>,
    events_rx: mpsc::Receiver<RuntimeEvent>,
    events_tx: mpsc::Sender<RuntimeEvent>,
    states: Vec<RuleState>,
}

impl<E: TaskExecutor + 'static> WatchEngine<E> {
    /// Build an engine over compiled rules.
    ///
    /// `events_tx` must be the sender side of `events_rx`; the engine uses it
    /// to feed rule completions back into its own loop.
    pub fn new(
        runner: PipelineRunner<E>,
        rules: Vec<WatchRule>,
        root: impl Into<PathBuf>,
        reload_hook: Option<String>,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let root = root.into();
        // Match the watcher, which canonicalizes before reporting paths.
        let root = root.canonicalize().unwrap_or(root);

        let states = vec![RuleState::default(); rules.len()];
        Self {
            runner,
            rules: Arc::new(rules),
            root,
            reload_hook,
            events_rx,
            events_tx,
            states,
        }
    }

    /// Main event loop. Runs until shutdown is requested or every sender is
    /// dropped.
    pub async fn run(mut self) -> Result<()> {
        info!(rules = self.rules.len(), "watch engine started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "engine received event");

            match event {
                RuntimeEvent::PathsChanged(paths) => self.handle_paths(&paths),
                RuntimeEvent::RuleFinished { rule, ok } => {
                    self.handle_rule_finished(rule, ok)
                }
                RuntimeEvent::ServerSettled => {
                    info!("server settled; requesting browser reload");
                    self.notify_reload();
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping engine");
                    break;
                }
            }
        }

        info!("watch engine exiting");
        Ok(())
    }

    fn handle_paths(&mut self, paths: &[PathBuf]) {
        let mut fired: BTreeSet<usize> = BTreeSet::new();

        for path in paths {
            let Some(rel) = self.rel_of(path) else {
                continue;
            };
            for (idx, rule) in self.rules.iter().enumerate() {
                if rule.matches(&rel) {
                    debug!(rule = %rule.name(), path = %rel, "watch rule matched");
                    fired.insert(idx);
                }
            }
        }

        for idx in fired {
            self.dispatch_rule(idx);
        }
    }

    /// Root-relative, slash-separated form of a watcher path.
    fn rel_of(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        Some(rel.to_string_lossy().replace('\\', "/"))
    }

    /// Run one rule's pipeline in the background, or mark it pending if it
    /// is already running.
    fn dispatch_rule(&mut self, idx: usize) {
        let state = &mut self.states[idx];
        if state.running {
            state.pending = true;
            debug!(rule = %self.rules[idx].name(), "rule busy; trigger coalesced");
            return;
        }
        state.running = true;

        let rules = Arc::clone(&self.rules);
        let runner = self.runner.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let rule = &rules[idx];
            info!(rule = %rule.name(), tasks = ?rule.tasks(), "watch rule fired");

            let ok = match runner.run_tasks(rule.tasks()).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(rule = %rule.name(), error = %err, "watch rule pipeline failed");
                    false
                }
            };

            let _ = tx.send(RuntimeEvent::RuleFinished { rule: idx, ok }).await;
        });
    }

    fn handle_rule_finished(&mut self, idx: usize, ok: bool) {
        self.states[idx].running = false;

        if ok && self.rules[idx].live_reload() {
            info!(rule = %self.rules[idx].name(), "requesting browser reload");
            self.notify_reload();
        }

        if self.states[idx].pending {
            self.states[idx].pending = false;
            self.dispatch_rule(idx);
        }
    }

    /// Fire the configured reload hook, if any. The hook is the boundary to
    /// whatever livereload mechanism the project uses; taskpipe only signals.
    fn notify_reload(&self) {
        let Some(hook) = self.reload_hook.clone() else {
            return;
        };
        spawn_shell(hook, "reload hook");
    }
}

/// Run a one-shot shell command in the background, logging failures.
pub(crate) fn spawn_shell(command: String, label: &'static str) {
    tokio::spawn(async move {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&command);
            c
        };

        match cmd.status().await {
            Ok(status) if !status.success() => {
                warn!(%command, ?status, "{label} exited with failure");
            }
            Err(err) => {
                warn!(%command, error = %err, "{label} failed to start");
            }
            _ => {}
        }
    });
}
