// src/pipeline/mod.rs

//! Pipeline entry point for the endless watch loop.

pub mod watch;

pub use watch::Watcher;
