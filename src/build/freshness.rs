// src/build/freshness.rs

//! Mtime-based staleness check for compiled stylesheets.
//!
//! The import scan is exactly one level deep: imports of imports are not
//! followed. This keeps the check cheap and cycle-free; a deeper change
//! still propagates because the directly imported file is rewritten (and
//! touched) when it is itself recompiled or edited.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::less::{STYLESHEET_EXTENSIONS, has_stylesheet_extension};

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*@import\s+['"]([^'"]+)"#).expect("import regex is valid")
});

/// Is the compiled output at `dest` out of date with respect to `source`
/// and its direct imports?
///
/// A destination with the same mtime as the newest input counts as fresh.
pub fn is_stale(source: &Path, dest: &Path) -> bool {
    mtime(dest) < mtime_including_imports(source)
}

/// Last-modified time of `source`, or of its newest one-level import if
/// that is more recent.
///
/// Imports are resolved relative to the source's own directory. A name that
/// already carries a stylesheet extension is probed directly; otherwise both
/// conventional extensions are probed and the newest existing one wins.
/// Missing files contribute `UNIX_EPOCH` rather than erroring, so an
/// unresolvable import never blocks a rebuild.
pub fn mtime_including_imports(source: &Path) -> SystemTime {
    let mut newest = mtime(source);

    let Ok(contents) = fs::read_to_string(source) else {
        return newest;
    };
    let dir = source.parent().unwrap_or_else(|| Path::new(""));

    for line in contents.lines() {
        let Some(caps) = IMPORT_RE.captures(line) else {
            continue;
        };
        let name = &caps[1];

        let imported_mtime = if has_stylesheet_extension(name) {
            mtime(&dir.join(name))
        } else {
            STYLESHEET_EXTENSIONS
                .iter()
                .map(|ext| mtime(&dir.join(format!("{name}.{ext}"))))
                .max()
                .unwrap_or(UNIX_EPOCH)
        };

        newest = newest.max(imported_mtime);
    }

    newest
}

/// Last-modified time of a file, or `UNIX_EPOCH` if it does not exist.
fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or(UNIX_EPOCH)
}
