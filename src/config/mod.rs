// src/config/mod.rs

//! Configuration loading and validation for taskpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate references, globs and server settings (`validate.rs`).
//!
//! The loaded [`ConfigFile`] is built once at startup and passed around by
//! reference; nothing mutates it afterwards.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    BundleMinifyConfig, CommentPolicy, ConfigFile, LintConfig, ServerConfig,
    StyleCompileConfig, TodoScanConfig, ToolsSection, VendorPrefixConfig,
    WatchRuleConfig,
};
pub use validate::validate_config;
