// src/watch/rules.rs

use std::fmt;

use globset::GlobSet;

use crate::config::model::ConfigFile;
use crate::errors::{Result, TaskpipeError};
use crate::tasks::invocation::build_globset;
use crate::tasks::{resolve_names, TaskId};

/// A compiled watch rule: glob set -> ordered task list.
///
/// Patterns are matched against root-relative, slash-separated paths.
#[derive(Clone)]
pub struct WatchRule {
    name: String,
    include: GlobSet,
    exclude: Option<GlobSet>,
    tasks: Vec<TaskId>,
    live_reload: bool,
}

impl fmt::Debug for WatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRule")
            .field("name", &self.name)
            .field("tasks", &self.tasks)
            .field("live_reload", &self.live_reload)
            .finish_non_exhaustive()
    }
}

impl WatchRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    pub fn live_reload(&self) -> bool {
        self.live_reload
    }

    /// Whether a changed path (relative to the project root) fires this rule.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compile every `[[watch]]` rule from the configuration.
///
/// A rule with `globs_from = "todo_scan"` borrows the scanner's include and
/// exclude lists, so the watched set follows `[todo_scan]` edits without
/// duplication. Rules are compiled once at startup; changing the watched set
/// requires a restart.
pub fn compile_rules(cfg: &ConfigFile) -> Result<Vec<WatchRule>> {
    let mut rules = Vec::with_capacity(cfg.watch.len());

    for rule in cfg.watch.iter() {
        let (include_patterns, mut exclude_patterns): (&[String], Vec<String>) =
            match rule.globs_from.as_deref() {
                Some("todo_scan") => {
                    (&cfg.todo_scan.include, cfg.todo_scan.exclude.clone())
                }
                _ => (&rule.globs, Vec::new()),
            };
        exclude_patterns.extend(rule.exclude.iter().cloned());

        let include = build_globset(include_patterns)?;
        let exclude = if exclude_patterns.is_empty() {
            None
        } else {
            Some(build_globset(&exclude_patterns)?)
        };

        let tasks = resolve_names(&rule.tasks).map_err(|unknown| {
            TaskpipeError::ConfigError(format!(
                "watch rule '{}' references unknown task '{unknown}'",
                rule.name
            ))
        })?;

        rules.push(WatchRule {
            name: rule.name.clone(),
            include,
            exclude,
            tasks,
            live_reload: rule.live_reload,
        });
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::WatchRuleConfig;

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

    #[test]
    fn rule_matches_its_globs_only() {
        let mut cfg = ConfigFile::default();
        cfg.watch.push(rule(
            "styles",
            &["app/less/**/*.less"],
            &["style_compile", "vendor_prefix"],
        ));

        let rules = compile_rules(&cfg).unwrap();
        assert_eq!(rules.len(), 1);

        assert!(rules[0].matches("app/less/main.less"));
        assert!(rules[0].matches("app/less/theme/dark.less"));
        assert!(!rules[0].matches("app/js/app.js"));
        assert_eq!(
            rules[0].tasks(),
            &[TaskId::StyleCompile, TaskId::VendorPrefix]
        );
    }

    #[test]
    fn derived_rule_uses_scanner_globs_and_excludes() {
        let mut cfg = ConfigFile::default();
        cfg.todo_scan.include = vec!["**/*.js".to_string()];
        cfg.todo_scan.exclude = vec!["node_modules/**".to_string()];

        let mut derived = rule("todo", &[], &["todo_scan"]);
        derived.globs_from = Some("todo_scan".to_string());
        cfg.watch.push(derived);

        let rules = compile_rules(&cfg).unwrap();

        assert!(rules[0].matches("app/js/app.js"));
        assert!(!rules[0].matches("node_modules/pkg/index.js"));
        assert!(!rules[0].matches("app/css/main.css"));
    }

    #[test]
    fn rule_exclude_wins_over_include() {
        let mut cfg = ConfigFile::default();
        let mut scripts = rule("scripts", &["app/js/**/*.js"], &["lint"]);
        scripts.exclude = vec!["app/js/combined.min.js".to_string()];
        cfg.watch.push(scripts);

        let rules = compile_rules(&cfg).unwrap();

        assert!(rules[0].matches("app/js/app.js"));
        assert!(!rules[0].matches("app/js/combined.min.js"));
    }

    #[test]
    fn sentinel_rule_matches_only_the_sentinel() {
        let mut cfg = ConfigFile::default();
        let mut sentinel = rule("server", &[".rebooted"], &[]);
        sentinel.live_reload = true;
        cfg.watch.push(sentinel);

        let rules = compile_rules(&cfg).unwrap();

        assert!(rules[0].matches(".rebooted"));
        assert!(!rules[0].matches("app/js/app.js"));
        assert!(rules[0].live_reload());
        assert!(rules[0].tasks().is_empty());
    }
}
