// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `taskpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskpipe",
    version,
    about = "Run build pipelines, watch files, and supervise a dev server.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskpipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Taskpipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run a named pipeline once and exit.
    Run {
        /// Pipeline name from `[pipelines]` (e.g. `default`).
        pipeline: String,

        /// Print the resolved tool invocations without executing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Watch files and re-run rule pipelines on change.
    Watch,

    /// Supervise the dev server and watch files, concurrently.
    Serve,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
