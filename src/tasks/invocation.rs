// src/tasks/invocation.rs

//! Rendering of typed task configs into external tool invocations.
//!
//! The orchestrator owns glob expansion (multi-input tools receive explicit
//! file lists) but interprets nothing else; flags are passed straight to the
//! tool named in `[tools]`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{CommentPolicy, ConfigFile};
use crate::errors::Result;
use crate::tasks::TaskId;

/// A fully rendered external command: program plus ordered arguments.
///
/// Paths inside `args` are relative to the project root; the executor runs
/// the program with the project root as its working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    fn args<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(items.into_iter().map(Into::into));
        self
    }

    /// Single-line rendering for logs and dry-run output.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for a in &self.args {
            line.push(' ');
            line.push_str(a);
        }
        line
    }
}

/// What running a task amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Spawn an external tool and wait for it.
    External(Invocation),
    /// Run the native todo scanner.
    ScanTodos,
}

/// Render the action for a task from the loaded configuration.
///
/// `root` is the project root; it is used to expand source globs for tools
/// that take explicit file lists.
pub fn plan_task(task: TaskId, cfg: &ConfigFile, root: &Path) -> Result<TaskAction> {
    let action = match task {
        TaskId::StyleCompile => {
            let sc = &cfg.style_compile;
            let mut inv = Invocation::new(&cfg.tools.less);
            if sc.minify {
                inv = inv.arg("--compress");
            }
            TaskAction::External(inv.arg(&sc.source).arg(&sc.output))
        }

        TaskId::VendorPrefix => TaskAction::External(
            Invocation::new(&cfg.tools.postcss)
                .arg("--use")
                .arg("autoprefixer")
                .arg("--replace")
                .arg(&cfg.vendor_prefix.target),
        ),

        TaskId::Lint => {
            let files = expand_globs(root, &cfg.lint.sources, &cfg.lint.exclude)?;
            let mut inv = Invocation::new(&cfg.tools.lint);
            for (key, value) in cfg.lint.options.iter() {
                inv = inv.arg(render_option(key, value));
            }
            TaskAction::External(inv.args(files))
        }

        TaskId::BundleMinify => {
            let bm = &cfg.bundle_minify;
            // The output must never be fed back into its own bundle.
            let mut exclude = bm.exclude.clone();
            exclude.push(bm.output.clone());

            let files = expand_globs(root, &bm.sources, &exclude)?;
            let mut inv = Invocation::new(&cfg.tools.minify).args(files);
            if bm.compress {
                inv = inv.arg("--compress");
            }
            if bm.mangle {
                inv = inv.arg("--mangle");
            }
            inv = inv.arg("--comments").arg(comments_flag(bm.comments));
            TaskAction::External(inv.arg("--output").arg(&bm.output))
        }

        TaskId::TodoScan => TaskAction::ScanTodos,
    };

    Ok(action)
}

fn comments_flag(policy: CommentPolicy) -> &'static str {
    match policy {
        CommentPolicy::All => "all",
        CommentPolicy::Some => "some",
        CommentPolicy::None => "false",
    }
}

/// Render one opaque option table entry as a CLI flag.
///
/// Booleans set to `true` become bare `--key`; everything else becomes
/// `--key=value` with the TOML value in its display form.
fn render_option(key: &str, value: &toml::Value) -> String {
    match value {
        toml::Value::Boolean(true) => format!("--{key}"),
        toml::Value::Boolean(false) => format!("--{key}=false"),
        toml::Value::String(s) => format!("--{key}={s}"),
        other => format!("--{key}={other}"),
    }
}

/// Build a GlobSet from simple string patterns.
pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build().map_err(anyhow::Error::from)?)
}

/// Expand include/exclude globs against the project root.
///
/// Returns root-relative, slash-separated paths in sorted order so rendered
/// commands are deterministic.
pub fn expand_globs(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<String>> {
    let include_set = build_globset(include)?;
    let exclude_set = if exclude.is_empty() {
        None
    } else {
        Some(build_globset(exclude)?)
    };

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(e) => e,
            // Directories can vanish mid-walk; skip rather than abort.
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path: PathBuf = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if include_set.is_match(&rel_str)
                        && !exclude_set
                            .as_ref()
                            .is_some_and(|ex| ex.is_match(&rel_str))
                    {
                        files.push(rel_str);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// sample").unwrap();
    }

    #[test]
    fn style_compile_renders_compiler_argv() {
        let cfg = ConfigFile::default();
        let tmp = tempfile::tempdir().unwrap();

        let action = plan_task(TaskId::StyleCompile, &cfg, tmp.path()).unwrap();
        let TaskAction::External(inv) = action else {
            panic!("expected external invocation");
        };

        assert_eq!(inv.program, "lessc");
        assert_eq!(
            inv.args,
            vec!["--compress", "app/less/main.less", "app/css/main.css"]
        );
    }

    #[test]
    fn vendor_prefix_rewrites_target_in_place() {
        let cfg = ConfigFile::default();
        let tmp = tempfile::tempdir().unwrap();

        let action = plan_task(TaskId::VendorPrefix, &cfg, tmp.path()).unwrap();
        let TaskAction::External(inv) = action else {
            panic!("expected external invocation");
        };

        assert_eq!(inv.program, "postcss");
        assert_eq!(
            inv.args,
            vec!["--use", "autoprefixer", "--replace", "app/css/main.css"]
        );
    }

    #[test]
    fn bundle_excludes_its_own_output() {
        let cfg = ConfigFile::default();
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "app/js/app.js");
        touch(tmp.path(), "app/js/combined.min.js");

        let action = plan_task(TaskId::BundleMinify, &cfg, tmp.path()).unwrap();
        let TaskAction::External(inv) = action else {
            panic!("expected external invocation");
        };

        // The input file list is everything before the first flag; the
        // bundle output reappears later as the `--output` value.
        let flags_at = inv.args.iter().position(|a| a.starts_with("--")).unwrap();
        let files = &inv.args[..flags_at];
        assert!(files.contains(&"app/js/app.js".to_string()));
        assert!(!files.contains(&"app/js/combined.min.js".to_string()));
        assert!(inv.args.ends_with(&[
            "--output".to_string(),
            "app/js/combined.min.js".to_string()
        ]));
    }

    #[test]
    fn comment_policy_maps_to_minifier_flag() {
        assert_eq!(comments_flag(CommentPolicy::All), "all");
        assert_eq!(comments_flag(CommentPolicy::Some), "some");
        assert_eq!(comments_flag(CommentPolicy::None), "false");
    }

    #[test]
    fn lint_options_render_as_flags() {
        let mut cfg = ConfigFile::default();
        cfg.lint
            .options
            .insert("browser".to_string(), toml::Value::Boolean(true));
        cfg.lint.options.insert(
            "maxerr".to_string(),
            toml::Value::Integer(50),
        );
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "app/js/app.js");

        let action = plan_task(TaskId::Lint, &cfg, tmp.path()).unwrap();
        let TaskAction::External(inv) = action else {
            panic!("expected external invocation");
        };

        assert_eq!(inv.program, "jshint");
        assert!(inv.args.contains(&"--browser".to_string()));
        assert!(inv.args.contains(&"--maxerr=50".to_string()));
        assert!(inv.args.contains(&"app/js/app.js".to_string()));
    }

    #[test]
    fn expand_globs_sorted_and_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "app/js/b.js");
        touch(tmp.path(), "app/js/a.js");
        touch(tmp.path(), "node_modules/x/y.js");

        let files = expand_globs(
            tmp.path(),
            &["**/*.js".to_string()],
            &["node_modules/**".to_string()],
        )
        .unwrap();

        assert_eq!(files, vec!["app/js/a.js", "app/js/b.js"]);
    }
}
