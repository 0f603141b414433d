// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    #[error("Task '{task}' failed with exit code {code}")]
    TaskFailed { task: String, code: i32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TaskpipeError>;
