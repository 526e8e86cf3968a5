// src/build/mod.rs

//! The incremental-rebuild decision engine.
//!
//! This module ties together:
//! - regex watchers with optional rewrite actions (`watchers.rs`)
//! - destination directory resolution (`destination.rs`)
//! - the mtime-based staleness check with one-level `@import` scanning
//!   (`freshness.rs`)
//! - the orchestrator that groups sources by destination and drives the
//!   compiler (`orchestrator.rs`)
//!
//! It does **not** know how change notifications are produced; callers hand
//! it lists of changed paths (relative to a project root) and it decides
//! what, if anything, to compile.

pub mod destination;
pub mod freshness;
pub mod orchestrator;
pub mod watchers;

pub use destination::resolve_destination;
pub use freshness::{is_stale, mtime_including_imports};
pub use orchestrator::Builder;
pub use watchers::{RewriteAction, Watcher, build_watchers, select_paths};
