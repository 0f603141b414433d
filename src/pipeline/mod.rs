// src/pipeline/mod.rs

//! Pipeline execution.
//!
//! A pipeline is an ordered list of tasks run strictly sequentially. This
//! module owns the runner loop and the executor seam:
//!
//! - [`runner`] resolves names and drives tasks in order, aborting on the
//!   first failure.
//! - [`executor`] spawns the external tools (or the native todo scanner)
//!   behind a trait so tests can substitute a fake.

pub mod executor;
pub mod runner;

pub use executor::{ProcessExecutor, TaskExecutor, TaskOutcome};
pub use runner::PipelineRunner;
