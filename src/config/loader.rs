// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::Result;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (task references, glob syntax). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file '{}'", path.display()))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing config file '{}'", path.display()))?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks that:
///   - pipelines and watch rules only reference known tasks,
///   - all glob patterns compile,
///   - the `[server]` section is sane.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Taskpipe.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `TASKPIPE_CONFIG`).
/// - Support project-local config discovery upwards from cwd.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskpipe.toml")
}
