// src/config/validate.rs

use anyhow::{Context, Result, anyhow};
use regex::Regex;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one `[[watcher]]` entry
/// - every `pattern` compiles as a regular expression
/// - no pattern matches the empty path (such a watcher would claim every
///   candidate and produce nonsense destinations)
///
/// Rewrite templates are not validated here; capture expansion cannot fail,
/// unknown group references simply expand to nothing.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.watcher.is_empty() {
        return Err(anyhow!(
            "config must contain at least one [[watcher]] entry"
        ));
    }

    for (idx, watcher) in cfg.watcher.iter().enumerate() {
        let regex = Regex::new(&watcher.pattern).with_context(|| {
            format!("invalid pattern in watcher #{}: {:?}", idx, watcher.pattern)
        })?;

        if regex.is_match("") {
            return Err(anyhow!(
                "pattern in watcher #{} matches the empty path: {:?}",
                idx,
                watcher.pattern
            ));
        }
    }

    Ok(())
}
