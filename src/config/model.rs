// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// Every section is optional in the file; defaults mirror the classic
/// front-end layout the tool was built around:
///
/// ```toml
/// [style_compile]
/// source = "app/less/main.less"
/// source_glob = "app/less/**/*.less"
/// output = "app/css/main.css"
/// minify = true
///
/// [pipelines]
/// default = ["style_compile", "vendor_prefix", "lint", "bundle_minify", "todo_scan"]
///
/// [[watch]]
/// name = "styles"
/// globs = ["app/less/**/*.less"]
/// tasks = ["style_compile", "vendor_prefix"]
/// live_reload = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// `[style_compile]` — stylesheet compilation settings.
    #[serde(default)]
    pub style_compile: StyleCompileConfig,

    /// `[vendor_prefix]` — CSS autoprefixing settings.
    #[serde(default)]
    pub vendor_prefix: VendorPrefixConfig,

    /// `[lint]` — script lint settings.
    #[serde(default)]
    pub lint: LintConfig,

    /// `[bundle_minify]` — script bundling/minification settings.
    #[serde(default)]
    pub bundle_minify: BundleMinifyConfig,

    /// `[todo_scan]` — todo-comment scanner settings.
    #[serde(default)]
    pub todo_scan: TodoScanConfig,

    /// `[pipelines]` — named, ordered task lists runnable via `run <name>`.
    #[serde(default = "default_pipelines")]
    pub pipelines: BTreeMap<String, Vec<String>>,

    /// `[[watch]]` — watch rules applied in `watch` and `serve` modes.
    #[serde(default)]
    pub watch: Vec<WatchRuleConfig>,

    /// `[server]` — dev-server supervisor settings for `serve` mode.
    #[serde(default)]
    pub server: ServerConfig,

    /// `[tools]` — overrides for the external tool programs.
    #[serde(default)]
    pub tools: ToolsSection,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            style_compile: StyleCompileConfig::default(),
            vendor_prefix: VendorPrefixConfig::default(),
            lint: LintConfig::default(),
            bundle_minify: BundleMinifyConfig::default(),
            todo_scan: TodoScanConfig::default(),
            pipelines: default_pipelines(),
            watch: Vec::new(),
            server: ServerConfig::default(),
            tools: ToolsSection::default(),
        }
    }
}

/// The built-in `default` pipeline, used when `[pipelines]` is absent.
fn default_pipelines() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        "default".to_string(),
        vec![
            "style_compile".to_string(),
            "vendor_prefix".to_string(),
            "lint".to_string(),
            "bundle_minify".to_string(),
            "todo_scan".to_string(),
        ],
    );
    map
}

/// `[style_compile]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleCompileConfig {
    /// Entry stylesheet handed to the compiler.
    #[serde(default = "default_style_source")]
    pub source: String,

    /// Glob covering all stylesheets. Used for watch-rule derivation; the
    /// compiler itself follows imports from `source`.
    #[serde(default = "default_style_source_glob")]
    pub source_glob: String,

    /// Compiled CSS output path.
    #[serde(default = "default_style_output")]
    pub output: String,

    /// Minify the CSS output.
    #[serde(default = "default_true")]
    pub minify: bool,
}

fn default_style_source() -> String {
    "app/less/main.less".to_string()
}

fn default_style_source_glob() -> String {
    "app/less/**/*.less".to_string()
}

fn default_style_output() -> String {
    "app/css/main.css".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StyleCompileConfig {
    fn default() -> Self {
        Self {
            source: default_style_source(),
            source_glob: default_style_source_glob(),
            output: default_style_output(),
            minify: true,
        }
    }
}

/// `[vendor_prefix]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorPrefixConfig {
    /// CSS file to prefix in place.
    #[serde(default = "default_style_output")]
    pub target: String,
}

impl Default for VendorPrefixConfig {
    fn default() -> Self {
        Self {
            target: default_style_output(),
        }
    }
}

/// `[lint]` section.
///
/// `options` is an opaque table forwarded to the linter; taskpipe does not
/// interpret the keys.
#[derive(Debug, Clone, Deserialize)]
pub struct LintConfig {
    /// Globs of scripts to lint.
    #[serde(default = "default_lint_sources")]
    pub sources: Vec<String>,

    /// Globs excluded from linting (e.g. generated bundles).
    #[serde(default = "default_script_excludes")]
    pub exclude: Vec<String>,

    /// Opaque linter options, rendered as `--key=value` flags.
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

fn default_lint_sources() -> Vec<String> {
    vec!["*.js".to_string(), "app/js/**/*.js".to_string()]
}

fn default_script_excludes() -> Vec<String> {
    vec!["app/js/combined.min.js".to_string()]
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            sources: default_lint_sources(),
            exclude: default_script_excludes(),
            options: BTreeMap::new(),
        }
    }
}

/// Comment-preservation policy for the minifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentPolicy {
    /// Keep all comments.
    All,
    /// Keep license-style comments only.
    #[default]
    Some,
    /// Strip every comment.
    None,
}

/// `[bundle_minify]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleMinifyConfig {
    /// Globs of scripts to concatenate.
    #[serde(default = "default_bundle_sources")]
    pub sources: Vec<String>,

    /// Globs excluded from the bundle (the output itself belongs here).
    #[serde(default = "default_script_excludes")]
    pub exclude: Vec<String>,

    /// Bundled, minified output path.
    #[serde(default = "default_bundle_output")]
    pub output: String,

    /// Mangle identifier names.
    #[serde(default)]
    pub mangle: bool,

    /// Apply compression passes.
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Which comments survive minification.
    #[serde(default)]
    pub comments: CommentPolicy,
}

fn default_bundle_sources() -> Vec<String> {
    vec!["app/js/**/*.js".to_string()]
}

fn default_bundle_output() -> String {
    "app/js/combined.min.js".to_string()
}

impl Default for BundleMinifyConfig {
    fn default() -> Self {
        Self {
            sources: default_bundle_sources(),
            exclude: default_script_excludes(),
            output: default_bundle_output(),
            mangle: false,
            compress: true,
            comments: CommentPolicy::default(),
        }
    }
}

/// `[todo_scan]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoScanConfig {
    /// Markdown file the collected items are written to.
    #[serde(default = "default_todo_output")]
    pub output: String,

    /// Globs of files to scan.
    #[serde(default = "default_todo_include")]
    pub include: Vec<String>,

    /// Globs never scanned (vendored code, generated output).
    #[serde(default = "default_todo_exclude")]
    pub exclude: Vec<String>,

    /// Comment tags collected by the scanner.
    #[serde(default = "default_todo_tags")]
    pub tags: Vec<String>,
}

fn default_todo_output() -> String {
    "todo.md".to_string()
}

fn default_todo_include() -> Vec<String> {
    vec![
        "**/*.js".to_string(),
        "app/**/*.less".to_string(),
        "app/**/*.ejs".to_string(),
        "app/**/*.html".to_string(),
    ]
}

fn default_todo_exclude() -> Vec<String> {
    vec!["node_modules/**".to_string(), "app/lib/**".to_string()]
}

fn default_todo_tags() -> Vec<String> {
    vec!["TODO".to_string(), "FIXME".to_string(), "HACK".to_string()]
}

impl Default for TodoScanConfig {
    fn default() -> Self {
        Self {
            output: default_todo_output(),
            include: default_todo_include(),
            exclude: default_todo_exclude(),
            tags: default_todo_tags(),
        }
    }
}

/// One `[[watch]]` rule.
///
/// Either `globs` or `globs_from` must be set. `globs_from = "todo_scan"`
/// reuses the scanner's include/exclude lists so the rule tracks them
/// without duplicating the glob list.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchRuleConfig {
    /// Rule name, used in logs and diagnostics.
    pub name: String,

    /// Globs (relative to the project root) that trigger this rule.
    #[serde(default)]
    pub globs: Vec<String>,

    /// Globs that never trigger this rule, even when `globs` match
    /// (generated outputs, vendored code).
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Derive the glob set from another task's configuration.
    /// Only `"todo_scan"` is supported.
    #[serde(default)]
    pub globs_from: Option<String>,

    /// Ordered task names re-run when the rule fires. May be empty for a
    /// pure live-reload rule.
    #[serde(default)]
    pub tasks: Vec<String>,

    /// Notify browser clients after this rule's tasks succeed.
    #[serde(default)]
    pub live_reload: bool,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Entry script of the supervised server.
    #[serde(default = "default_server_script")]
    pub script: String,

    /// Program used to launch the entry script.
    #[serde(default = "default_server_runner")]
    pub runner: String,

    /// Exported to the server process as `PORT`.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// File extensions (backend sources) whose changes restart the server.
    #[serde(default = "default_server_extensions")]
    pub extensions: Vec<String>,

    /// Settle delay between a (re)start and the ready signal.
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Open `http://localhost:<port>` once on the initial start.
    #[serde(default)]
    pub open_browser: bool,

    /// Sentinel file touched after each settle delay, for external
    /// livereload tooling. Never read back by taskpipe itself.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Optional hook command run whenever browsers should reload.
    #[serde(default)]
    pub on_reload: Option<String>,
}

fn default_server_script() -> String {
    "server.js".to_string()
}

fn default_server_runner() -> String {
    "node".to_string()
}

fn default_server_port() -> u16 {
    9000
}

fn default_server_extensions() -> Vec<String> {
    vec!["js".to_string(), "ejs".to_string(), "html".to_string()]
}

fn default_restart_delay_ms() -> u64 {
    1000
}

fn default_sentinel() -> String {
    ".rebooted".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            script: default_server_script(),
            runner: default_server_runner(),
            port: default_server_port(),
            extensions: default_server_extensions(),
            restart_delay_ms: default_restart_delay_ms(),
            open_browser: false,
            sentinel: default_sentinel(),
            on_reload: None,
        }
    }
}

/// `[tools]` section: program names for the delegated external tools.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// Stylesheet compiler.
    #[serde(default = "default_tool_less")]
    pub less: String,

    /// CSS postprocessor running the autoprefixer.
    #[serde(default = "default_tool_postcss")]
    pub postcss: String,

    /// Script minifier.
    #[serde(default = "default_tool_minify")]
    pub minify: String,

    /// Script linter.
    #[serde(default = "default_tool_lint")]
    pub lint: String,
}

fn default_tool_less() -> String {
    "lessc".to_string()
}

fn default_tool_postcss() -> String {
    "postcss".to_string()
}

fn default_tool_minify() -> String {
    "terser".to_string()
}

fn default_tool_lint() -> String {
    "jshint".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            less: default_tool_less(),
            postcss: default_tool_postcss(),
            minify: default_tool_minify(),
            lint: default_tool_lint(),
        }
    }
}
