// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The CLI is deliberately thin: every build decision lives in the core
//! `build` module. This layer only tells the tool where its config is and
//! whether to keep watching after the first pass.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchless`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchless",
    version,
    about = "Incrementally compile LESS stylesheets when their sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Watchless.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Watchless.toml")]
    pub config: String,

    /// Run one full build based on current state, no watching.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHLESS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the configured watchers, but don't compile.
    #[arg(long)]
    pub dry_run: bool,
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
