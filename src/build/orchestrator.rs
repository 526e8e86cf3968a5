// src/build/orchestrator.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::build::destination::resolve_destination;
use crate::build::freshness::is_stale;
use crate::build::watchers::{Watcher, select_paths};
use crate::config::Options;
use crate::less::{CompileRequest, Compiler, LessCompiler, STYLESHEET_EXTENSIONS};
use crate::ui::{TracingUi, Ui};

/// Basenames starting with this marker are partials, only ever pulled in via
/// `@import`, and are never compiled directly.
const PARTIAL_MARKER: char = '_';

/// The build orchestrator.
///
/// Owns the immutable options and watcher list, a project root all relative
/// paths are resolved against, an injected log sink and an injected
/// compiler. Processing is single-threaded and synchronous: directories and
/// files are handled strictly in the order they were grouped.
pub struct Builder {
    options: Options,
    watchers: Vec<Watcher>,
    root: PathBuf,
    compiler: Box<dyn Compiler>,
    ui: Arc<dyn Ui>,
}

impl Builder {
    pub fn new(options: Options, watchers: Vec<Watcher>, root: impl Into<PathBuf>) -> Self {
        Self {
            options,
            watchers,
            root: root.into(),
            compiler: Box::new(LessCompiler),
            ui: Arc::new(TracingUi),
        }
    }

    /// Replace the log sink (tests, embedders).
    pub fn with_ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = ui;
        self
    }

    /// Replace the compiler implementation.
    pub fn with_compiler(mut self, compiler: Box<dyn Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Startup entry point: announce ourselves and, when configured, run a
    /// full build once.
    pub fn start(&self) -> Result<bool> {
        self.ui.info(&format!(
            "watchless {} is on the job",
            env!("CARGO_PKG_VERSION")
        ));
        if self.options.all_on_start {
            return self.run_all();
        }
        Ok(true)
    }

    /// Change-driven entry point.
    pub fn run_on_changes(&self, paths: &[String]) -> Result<bool> {
        if self.options.all_after_change {
            return self.run_all();
        }
        self.run(paths)
    }

    /// Full rebuild: list every file under the project root, filter through
    /// the watchers and hand the result to [`Builder::run`].
    pub fn run_all(&self) -> Result<bool> {
        self.ui.info("compiling all stylesheets");
        let candidates = self.list_files()?;
        let selected = select_paths(candidates.iter().map(String::as_str), &self.watchers);
        self.run(&selected)
    }

    /// Compile the given source paths, grouped by destination directory.
    ///
    /// Returns true only if every attempted compile succeeded; skipped files
    /// do not affect the flag. Compiler failures are caught per file and
    /// never abort the batch; filesystem errors (directory creation, output
    /// writes) propagate.
    pub fn run(&self, paths: &[String]) -> Result<bool> {
        let mut success = true;

        for (directory, sources) in self.directory_groups(paths) {
            for source in sources {
                let basename = basename_of(&source);
                if basename.starts_with(PARTIAL_MARKER) {
                    debug!(source = %source, "skipping partial");
                    continue;
                }

                let cssfile = directory.join(css_basename(basename));
                if cssfile == Path::new(&source) {
                    self.ui.info(&format!(
                        "skipping {source} since the output would overwrite the original file"
                    ));
                    continue;
                }

                let abs_source = self.absolute(&source);
                let abs_css = self.absolute(&cssfile);

                if !is_stale(&abs_source, &abs_css) {
                    self.ui.info(&format!(
                        "skipping {} because {} is already up-to-date",
                        source,
                        cssfile.display()
                    ));
                    continue;
                }

                fs::create_dir_all(self.absolute(&directory))
                    .with_context(|| format!("creating output directory {:?}", directory))?;

                self.ui
                    .info(&format!("{} -> {}", source, cssfile.display()));

                if !self.compile(&source, &abs_source, &abs_css)? {
                    success = false;
                }
            }
        }

        Ok(success)
    }

    /// Group the selected sources by destination directory.
    ///
    /// Iteration order is insertion order: the first source resolving to a
    /// destination determines where that destination appears, and each
    /// destination lists its sources in first-seen order without duplicates.
    fn directory_groups(&self, paths: &[String]) -> Vec<(PathBuf, Vec<String>)> {
        let selected = select_paths(paths.iter().map(String::as_str), &self.watchers);
        let mut groups: Vec<(PathBuf, Vec<String>)> = Vec::new();

        for source in selected {
            for watcher in &self.watchers {
                let Some(caps) = watcher.captures(&source) else {
                    continue;
                };
                let target =
                    resolve_destination(&source, &caps, self.options.output.as_deref());

                match groups.iter_mut().find(|(dir, _)| *dir == target) {
                    Some((_, sources)) => {
                        if !sources.contains(&source) {
                            sources.push(source.clone());
                        }
                    }
                    None => groups.push((target, vec![source.clone()])),
                }
            }
        }

        groups
    }

    /// Invoke the compiler for one file and write its output.
    ///
    /// Returns Ok(false) when the compiler reported a failure; the error is
    /// logged here and the batch continues.
    fn compile(&self, source: &str, abs_source: &Path, abs_css: &Path) -> Result<bool> {
        let mut search_paths = Vec::with_capacity(1 + self.options.import_paths.len());
        if let Some(dir) = abs_source.parent() {
            search_paths.push(dir.to_path_buf());
        }
        search_paths.extend(self.options.import_paths.iter().map(|p| self.absolute(p)));

        let request = CompileRequest {
            filename: abs_source.to_path_buf(),
            search_paths,
            compress: self.options.compress,
            yuicompress: self.options.yuicompress,
        };

        match self.compiler.compile(&request) {
            Ok(css) => {
                fs::write(abs_css, css)
                    .with_context(|| format!("writing compiled output to {:?}", abs_css))?;
                Ok(true)
            }
            Err(err) => {
                self.ui
                    .info(&format!("compiling {source} failed with message: {err}"));
                Ok(false)
            }
        }
    }

    /// All files under the project root, as root-relative forward-slash
    /// paths.
    fn list_files(&self) -> Result<Vec<String>> {
        let pattern = self.root.join("**/*.*");
        let pattern = pattern.to_string_lossy().into_owned();

        let mut files = Vec::new();
        for entry in glob::glob(&pattern)
            .with_context(|| format!("listing files under {:?}", self.root))?
        {
            let path = entry.context("reading directory entry")?;
            if !path.is_file() {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(&self.root) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(files)
    }

    fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn basename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Output filename: the stylesheet extension replaced by `.css`.
///
/// A basename without a recognized extension is returned unchanged, which
/// lets the overwrite guard catch watchers misconfigured to match CSS.
fn css_basename(basename: &str) -> String {
    for ext in STYLESHEET_EXTENSIONS {
        if let Some(stem) = basename.strip_suffix(&format!(".{ext}")) {
            return format!("{stem}.css");
        }
    }
    basename.to_string()
}
