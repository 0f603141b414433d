// src/tasks/todo.rs

//! Native todo-comment scanner.
//!
//! Walks the configured include/exclude globs, collects lines carrying one
//! of the configured tags (TODO, FIXME, ...) and writes them to a markdown
//! file grouped by source file. This is the only task taskpipe performs
//! itself rather than delegating to an external tool.

use std::fs;
use std::path::Path;

use anyhow::Context;
use regex::Regex;
use tracing::{debug, info};

use crate::config::model::TodoScanConfig;
use crate::errors::Result;
use crate::tasks::invocation::expand_globs;

/// One collected todo item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    /// Root-relative path of the file the item was found in.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// The tag that matched (e.g. `TODO`).
    pub tag: String,
    /// Text following the tag, trimmed.
    pub text: String,
}

/// Scan the project for tagged comments.
///
/// Files that are not valid UTF-8 are skipped; the scanner is for source
/// text, not assets.
pub fn scan_todos(cfg: &TodoScanConfig, root: &Path) -> Result<Vec<TodoItem>> {
    let matcher = tag_regex(&cfg.tags)?;
    let files = expand_globs(root, &cfg.include, &cfg.exclude)?;

    let mut items = Vec::new();
    for rel in files {
        let Ok(contents) = fs::read_to_string(root.join(&rel)) else {
            debug!(file = %rel, "skipping non-UTF-8 file");
            continue;
        };

        for (idx, line) in contents.lines().enumerate() {
            if let Some(caps) = matcher.captures(line) {
                items.push(TodoItem {
                    file: rel.clone(),
                    line: idx + 1,
                    tag: caps[1].to_string(),
                    text: caps
                        .get(2)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default(),
                });
            }
        }
    }

    Ok(items)
}

/// Scan and write the markdown report to `cfg.output` (relative to `root`).
pub fn run_todo_scan(cfg: &TodoScanConfig, root: &Path) -> Result<()> {
    let items = scan_todos(cfg, root)?;
    let report = render_markdown(&items);

    let out_path = root.join(&cfg.output);
    fs::write(&out_path, report)
        .with_context(|| format!("writing todo report to {}", out_path.display()))?;

    info!(
        items = items.len(),
        output = %cfg.output,
        "todo scan complete"
    );
    Ok(())
}

fn tag_regex(tags: &[String]) -> Result<Regex> {
    let escaped: Vec<String> = tags.iter().map(|t| regex::escape(t)).collect();
    let pattern = format!(r"\b({})\b[:\s]*(.*)", escaped.join("|"));
    Ok(Regex::new(&pattern)
        .with_context(|| format!("building todo tag regex from {tags:?}"))?)
}

fn render_markdown(items: &[TodoItem]) -> String {
    let mut out = String::from("# Todos\n");

    if items.is_empty() {
        out.push_str("\nNothing found.\n");
        return out;
    }

    let mut current_file: Option<&str> = None;
    for item in items {
        if current_file != Some(item.file.as_str()) {
            out.push_str(&format!("\n## {}\n", item.file));
            current_file = Some(item.file.as_str());
        }
        out.push_str(&format!(
            "- [ ] `{}:{}` **{}** {}\n",
            item.file, item.line, item.tag, item.text
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn cfg() -> TodoScanConfig {
        TodoScanConfig {
            output: "todo.md".to_string(),
            include: vec!["**/*.js".to_string()],
            exclude: vec!["vendor/**".to_string()],
            tags: vec!["TODO".to_string(), "FIXME".to_string()],
        }
    }

    #[test]
    fn collects_tagged_lines_with_positions() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "app.js",
            "var x = 1;\n// TODO: wire up login\n// FIXME flaky on reload\n",
        );

        let items = scan_todos(&cfg(), tmp.path()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tag, "TODO");
        assert_eq!(items[0].line, 2);
        assert_eq!(items[0].text, "wire up login");
        assert_eq!(items[1].tag, "FIXME");
        assert_eq!(items[1].line, 3);
    }

    #[test]
    fn excluded_files_are_not_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "app.js", "// TODO keep\n");
        write(tmp.path(), "vendor/lib.js", "// TODO drop\n");

        let items = scan_todos(&cfg(), tmp.path()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file, "app.js");
    }

    #[test]
    fn untagged_lines_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "app.js", "var todoList = [];\n// note: fine\n");

        let items = scan_todos(&cfg(), tmp.path()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn report_groups_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.js", "// TODO first\n");
        write(tmp.path(), "b.js", "// TODO second\n");

        run_todo_scan(&cfg(), tmp.path()).unwrap();

        let report = fs::read_to_string(tmp.path().join("todo.md")).unwrap();
        assert!(report.contains("## a.js"));
        assert!(report.contains("## b.js"));
        assert!(report.contains("**TODO** first"));
    }
}
