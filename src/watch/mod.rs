// src/watch/mod.rs

//! File-change notification delivery.
//!
//! This module wires up a cross-platform filesystem watcher (`notify`) over
//! the project root and forwards batches of root-relative changed paths to
//! the main loop. It is delivery only: it does **not** decide what to
//! build — that is the `build` module's job.

pub mod watcher;

pub use watcher::{WatcherHandle, spawn_watcher};
