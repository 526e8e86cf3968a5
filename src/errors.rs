// src/errors.rs

//! Crate-wide error aliases.
//!
//! Most of the crate propagates `anyhow` errors; the only structured error
//! taxonomy lives in `less::CompileError`, which the orchestrator catches
//! per file instead of bubbling up.

pub use anyhow::{Error, Result};
