// src/serve/mod.rs

//! Dev-server supervision for `serve` mode.
//!
//! The supervisor is one of the two long-running collaborators in serve
//! mode (the other is the watch engine). It owns the server process and its
//! restart policy; the engine only hears about settles via
//! [`crate::engine::RuntimeEvent::ServerSettled`].

pub mod supervisor;

pub use supervisor::Supervisor;
