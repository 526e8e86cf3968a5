// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod errors;
pub mod less;
pub mod logging;
pub mod ui;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::build::{Builder, build_watchers};
use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;

/// How long to keep draining the change channel before starting a build, so
/// an editor save burst arrives as one batch.
const SETTLE_WINDOW: Duration = Duration::from_millis(50);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the build orchestrator
/// - (unless `--once`) the file watcher and the change loop
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let watchers = build_watchers(&cfg.watcher)?;
    let root = config_root_dir(&config_path);
    let builder = Builder::new(cfg.options.clone(), watchers, root.clone());

    builder.start()?;

    if args.once {
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<Vec<String>>();
    let _watcher_handle = watch::spawn_watcher(&root, tx)?;

    while let Ok(mut changed) = rx.recv() {
        while let Ok(more) = rx.recv_timeout(SETTLE_WINDOW) {
            changed.extend(more);
        }
        debug!(?changed, "change notification received");
        builder.run_on_changes(&changed)?;
    }

    info!("change channel closed, exiting");
    Ok(())
}

/// Figure out a sensible project root for watching and path resolution.
/// Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Simple dry-run output: print options and watchers.
fn print_dry_run(cfg: &ConfigFile) {
    println!("watchless dry-run");
    println!("  options.all_after_change = {}", cfg.options.all_after_change);
    println!("  options.all_on_start = {}", cfg.options.all_on_start);
    if let Some(ref output) = cfg.options.output {
        println!("  options.output = {}", output.display());
    }
    if !cfg.options.import_paths.is_empty() {
        println!("  options.import_paths = {:?}", cfg.options.import_paths);
    }
    println!("  options.compress = {}", cfg.options.compress);
    println!("  options.yuicompress = {}", cfg.options.yuicompress);
    println!();

    println!("watchers ({}):", cfg.watcher.len());
    for watcher in cfg.watcher.iter() {
        println!("  - pattern: {}", watcher.pattern);
        if let Some(ref rewrite) = watcher.rewrite {
            println!("    rewrite: {rewrite}");
        }
    }

    debug!("dry-run complete (no compilation)");
}
