// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling `[[watch]]` rules into glob sets (`rules.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that feeds
//!   changed paths into the engine (`watcher.rs`).
//!
//! It does **not** run pipelines itself; it only turns filesystem changes
//! into engine events.

pub mod rules;
pub mod watcher;

pub use rules::{compile_rules, WatchRule};
pub use watcher::{spawn_watcher, WatcherHandle};
