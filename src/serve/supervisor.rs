// src/serve/supervisor.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::model::ServerConfig;
use crate::engine::{spawn_shell, RuntimeEvent};
use crate::errors::Result;

/// Pause between crash and respawn when the server exits on its own.
const CRASH_RESTART_PAUSE: Duration = Duration::from_millis(500);

/// Supervises the dev-server process.
///
/// Responsibilities:
/// - spawn `runner script` with `PORT` exported
/// - restart it when a backend source file changes or the process exits
/// - after each restart, wait the settle delay, then write the sentinel
///   file and emit [`RuntimeEvent::ServerSettled`] to the engine
///
/// The settle delay is a heuristic: if the server takes longer than the
/// delay to begin listening, the reload signal fires early. Servers that
/// need a hard guarantee should expose a readiness probe instead.
pub struct Supervisor {
    cfg: ServerConfig,
    root: PathBuf,
    /// Change events from the supervisor's own filesystem watcher.
    changes_rx: mpsc::Receiver<RuntimeEvent>,
    /// Settle notifications into the shared engine loop.
    engine_tx: mpsc::Sender<RuntimeEvent>,
}

impl Supervisor {
    pub fn new(
        cfg: ServerConfig,
        root: impl Into<PathBuf>,
        changes_rx: mpsc::Receiver<RuntimeEvent>,
        engine_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            cfg,
            root: root.into(),
            changes_rx,
            engine_tx,
        }
    }

    /// Run the supervision loop. Returns when the change channel closes
    /// (i.e. the rest of the application is shutting down).
    pub async fn run(mut self) -> Result<()> {
        let mut first_start = true;

        loop {
            let mut child = self.spawn_server()?;
            info!(
                script = %self.cfg.script,
                port = self.cfg.port,
                "dev server started"
            );

            if first_start {
                first_start = false;
                if self.cfg.open_browser {
                    self.open_browser_after_settle();
                }
            } else {
                // Restart: arm the settle signal for livereload clients.
                let delay = Duration::from_millis(self.cfg.restart_delay_ms);
                let sentinel = self.root.join(&self.cfg.sentinel);
                let tx = self.engine_tx.clone();
                tokio::spawn(settle_after(delay, sentinel, tx));
            }

            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) => {
                            warn!(?status, "dev server exited; restarting");
                        }
                        Err(err) => {
                            warn!(error = %err, "failed waiting on dev server; restarting");
                        }
                    }
                    sleep(CRASH_RESTART_PAUSE).await;
                }

                changed = next_backend_change(&mut self.changes_rx, &self.cfg.extensions) => {
                    match changed {
                        Some(path) => {
                            info!(path = %path.display(), "backend change; restarting dev server");
                            if let Err(err) = child.kill().await {
                                warn!(error = %err, "failed to kill dev server for restart");
                            }
                        }
                        None => {
                            info!("change channel closed; stopping supervisor");
                            let _ = child.kill().await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn spawn_server(&self) -> Result<Child> {
        let mut cmd = Command::new(&self.cfg.runner);
        cmd.arg(&self.cfg.script)
            .env("PORT", self.cfg.port.to_string())
            .current_dir(&self.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "spawning dev server '{} {}'",
                self.cfg.runner, self.cfg.script
            )
        })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let reader = BufReader::new(stdout);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(target: "taskpipe::server", "{}", line);
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!(target: "taskpipe::server", "{}", line);
                }
            });
        }

        Ok(child)
    }

    /// Open the browser once the server has had its settle delay to bind.
    fn open_browser_after_settle(&self) {
        let delay = Duration::from_millis(self.cfg.restart_delay_ms);
        let url = format!("http://localhost:{}", self.cfg.port);

        tokio::spawn(async move {
            sleep(delay).await;
            info!(%url, "opening browser");
            let opener = if cfg!(target_os = "macos") {
                "open"
            } else if cfg!(windows) {
                "start"
            } else {
                "xdg-open"
            };
            spawn_shell(format!("{opener} {url}"), "browser opener");
        });
    }
}

/// Wait for the settle delay, then touch the sentinel and notify the engine.
///
/// The sentinel write must happen no sooner than `delay` after the restart
/// began; livereload tooling watching the file relies on that spacing.
pub(crate) async fn settle_after(
    delay: Duration,
    sentinel: PathBuf,
    engine_tx: mpsc::Sender<RuntimeEvent>,
) {
    sleep(delay).await;

    if let Err(err) = std::fs::write(&sentinel, b"rebooted\n") {
        warn!(
            sentinel = %sentinel.display(),
            error = %err,
            "failed to write sentinel file"
        );
    } else {
        debug!(sentinel = %sentinel.display(), "sentinel written");
    }

    let _ = engine_tx.send(RuntimeEvent::ServerSettled).await;
}

/// Pull change events until one touches a file with a watched extension.
///
/// Returns `None` when the channel closes.
async fn next_backend_change(
    changes_rx: &mut mpsc::Receiver<RuntimeEvent>,
    extensions: &[String],
) -> Option<PathBuf> {
    while let Some(event) = changes_rx.recv().await {
        if let RuntimeEvent::PathsChanged(paths) = event {
            if let Some(path) = paths
                .into_iter()
                .find(|p| has_watched_extension(p, extensions))
            {
                return Some(path);
            }
        }
    }
    None
}

fn has_watched_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|w| w == ext))
}
