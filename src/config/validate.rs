// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, WatchRuleConfig};
use crate::errors::{Result, TaskpipeError};
use crate::tasks::TaskId;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - every pipeline references only known task names
/// - every watch rule references only known task names
/// - watch rules have a glob source and something to do
/// - `globs_from` only names `todo_scan`
/// - all glob patterns compile
/// - `[server]` has a nonzero port and a non-empty script
///
/// It does **not** check that referenced source files exist; the external
/// tools report that themselves at execution time.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_pipelines(cfg)?;
    validate_watch_rules(cfg)?;
    validate_globs(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_pipelines(cfg: &ConfigFile) -> Result<()> {
    for (name, tasks) in cfg.pipelines.iter() {
        if tasks.is_empty() {
            return Err(TaskpipeError::ConfigError(format!(
                "pipeline '{name}' is empty"
            )));
        }
        for task in tasks {
            if TaskId::parse(task).is_none() {
                return Err(TaskpipeError::ConfigError(format!(
                    "pipeline '{name}' references unknown task '{task}'"
                )));
            }
        }
    }
    Ok(())
}

fn validate_watch_rules(cfg: &ConfigFile) -> Result<()> {
    for rule in cfg.watch.iter() {
        validate_watch_rule(rule)?;
    }
    Ok(())
}

fn validate_watch_rule(rule: &WatchRuleConfig) -> Result<()> {
    match rule.globs_from.as_deref() {
        None => {
            if rule.globs.is_empty() {
                return Err(TaskpipeError::ConfigError(format!(
                    "watch rule '{}' has neither `globs` nor `globs_from`",
                    rule.name
                )));
            }
        }
        Some("todo_scan") => {
            if !rule.globs.is_empty() {
                return Err(TaskpipeError::ConfigError(format!(
                    "watch rule '{}' sets both `globs` and `globs_from`",
                    rule.name
                )));
            }
        }
        Some(other) => {
            return Err(TaskpipeError::ConfigError(format!(
                "watch rule '{}': `globs_from = \"{other}\"` is not supported \
                 (only \"todo_scan\")",
                rule.name
            )));
        }
    }

    if rule.tasks.is_empty() && !rule.live_reload {
        return Err(TaskpipeError::ConfigError(format!(
            "watch rule '{}' has no tasks and no live_reload; it would do nothing",
            rule.name
        )));
    }

    for task in rule.tasks.iter() {
        if TaskId::parse(task).is_none() {
            return Err(TaskpipeError::ConfigError(format!(
                "watch rule '{}' references unknown task '{task}'",
                rule.name
            )));
        }
    }

    Ok(())
}

fn validate_globs(cfg: &ConfigFile) -> Result<()> {
    let check = |context: &str, patterns: &[String]| -> Result<()> {
        for pat in patterns {
            Glob::new(pat).map_err(|e| {
                TaskpipeError::ConfigError(format!(
                    "invalid glob '{pat}' in {context}: {e}"
                ))
            })?;
        }
        Ok(())
    };

    check("[style_compile]", std::slice::from_ref(&cfg.style_compile.source_glob))?;
    check("[lint].sources", &cfg.lint.sources)?;
    check("[lint].exclude", &cfg.lint.exclude)?;
    check("[bundle_minify].sources", &cfg.bundle_minify.sources)?;
    check("[bundle_minify].exclude", &cfg.bundle_minify.exclude)?;
    check("[todo_scan].include", &cfg.todo_scan.include)?;
    check("[todo_scan].exclude", &cfg.todo_scan.exclude)?;

    for rule in cfg.watch.iter() {
        check(&format!("watch rule '{}'", rule.name), &rule.globs)?;
        check(&format!("watch rule '{}' exclude", rule.name), &rule.exclude)?;
    }

    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    if cfg.server.script.trim().is_empty() {
        return Err(TaskpipeError::ConfigError(
            "[server].script must not be empty".to_string(),
        ));
    }
    if cfg.server.port == 0 {
        return Err(TaskpipeError::ConfigError(
            "[server].port must be nonzero".to_string(),
        ));
    }
    Ok(())
}
