// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [options]
/// all_on_start = true
/// output = "public/stylesheets"
/// import_paths = ["lib/styles"]
///
/// [[watcher]]
/// pattern = '^app/styles/(.+)\.less$'
/// ```
///
/// All sections are optional and have the documented defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Build behaviour from `[options]`.
    #[serde(default)]
    pub options: Options,

    /// All `[[watcher]]` entries, in file order.
    #[serde(default)]
    pub watcher: Vec<WatcherConfig>,
}

/// `[options]` section.
///
/// An immutable record with a fixed set of recognized keys: explicit values
/// override the defaults, absent keys take the default. Read-only once
/// loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Options {
    /// After any change notification, rebuild everything matched by the
    /// watchers rather than only the changed subset.
    #[serde(default = "default_true")]
    pub all_after_change: bool,

    /// Run a full build once at startup.
    #[serde(default = "default_true")]
    pub all_on_start: bool,

    /// Fixed destination root. If absent, output mirrors the source
    /// directory.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Additional search roots for `@import` resolution, appended after the
    /// source file's own directory.
    #[serde(default)]
    pub import_paths: Vec<PathBuf>,

    /// Compact the rendered CSS.
    #[serde(default)]
    pub compress: bool,

    /// Minify the rendered CSS (YUI-style, more aggressive than `compress`).
    #[serde(default)]
    pub yuicompress: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            all_after_change: true,
            all_on_start: true,
            output: None,
            import_paths: Vec::new(),
            compress: false,
            yuicompress: false,
        }
    }
}

/// A single `[[watcher]]` entry.
///
/// `pattern` is a regular expression over relative file paths; capture group
/// 1, if present, exposes the matched subpath used for destination
/// mirroring. `rewrite` is an optional replacement template expanded with
/// `$1`-style capture references; when present, the expansion replaces the
/// matched path in the selection output.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    pub pattern: String,

    #[serde(default)]
    pub rewrite: Option<String>,
}
