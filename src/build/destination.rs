// src/build/destination.rs

use std::path::{Path, PathBuf};

use regex::Captures;

/// Compute the destination directory for a matched source path.
///
/// - Base target is the `output` option when set, otherwise the source
///   file's own directory.
/// - If the matching pattern captured a subpath (group 1), the capture's
///   directory portion is appended to the base so nested structure is
///   mirrored under the alternate root. A capture that is just a filename
///   yields no nesting.
pub fn resolve_destination(
    source: &str,
    caps: &Captures<'_>,
    output: Option<&Path>,
) -> PathBuf {
    let base = match output {
        Some(dir) => dir.to_path_buf(),
        None => Path::new(source)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf(),
    };

    match caps.get(1) {
        Some(subpath) => match Path::new(subpath.as_str()).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => base.join(dir),
            _ => base,
        },
        None => base,
    }
}
