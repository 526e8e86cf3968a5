// src/less/mod.rs

//! The stylesheet compiler seam.
//!
//! The orchestrator only depends on the [`Compiler`] trait: give it a source
//! filename, ordered import search paths and the compaction flags, get back
//! rendered CSS text or a [`CompileError`]. The bundled implementation is
//! [`LessCompiler`], a small LESS renderer covering variables, imports and
//! flat rule sets; embedders can swap in anything else that satisfies the
//! trait.

pub mod compiler;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use compiler::{LessCompiler, Parser, RenderOptions, Stylesheet};

/// Extensions recognized as stylesheet sources.
pub const STYLESHEET_EXTENSIONS: [&str; 2] = ["less", "lss"];

/// Does `name` already carry one of the recognized stylesheet extensions?
pub fn has_stylesheet_extension(name: &str) -> bool {
    STYLESHEET_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}

/// Everything a compiler needs for one source file.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// The source file to read and compile.
    pub filename: PathBuf,

    /// Directories searched for `@import` targets, in order. The source
    /// file's own directory comes first by convention.
    pub search_paths: Vec<PathBuf>,

    /// Compact the rendered output.
    pub compress: bool,

    /// Minify the rendered output (more aggressive than `compress`).
    pub yuicompress: bool,
}

/// A stylesheet failed to parse or render.
///
/// These are caught per file by the orchestrator and never abort a batch;
/// filesystem errors outside the compiler go through `anyhow` instead.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("variable @{name} is undefined")]
    UndefinedVariable { name: String },

    #[error("'{name}' wasn't found among the import search paths")]
    MissingImport { name: String },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse one stylesheet source and render CSS text.
pub trait Compiler: Send + Sync {
    fn compile(&self, request: &CompileRequest) -> Result<String, CompileError>;
}
