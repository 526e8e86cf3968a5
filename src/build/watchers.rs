// src/build/watchers.rs

use std::fmt;

use anyhow::{Context, Result};
use regex::{Captures, Regex};

use crate::config::WatcherConfig;

/// A rewrite action maps a pattern match to a replacement path.
///
/// Watchers built from config use a `Captures::expand` template; embedders
/// can supply arbitrary closures (e.g. mapping any change to one master
/// stylesheet).
pub type RewriteAction = Box<dyn Fn(&Captures) -> String + Send + Sync>;

/// A (pattern, optional rewrite-action) pair.
///
/// The pattern is a regular expression over relative file paths; capture
/// group 1, if present, exposes the matched subpath. Immutable once built.
pub struct Watcher {
    pattern: Regex,
    action: Option<RewriteAction>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("pattern", &self.pattern.as_str())
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl Watcher {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            action: None,
        }
    }

    pub fn with_action(pattern: Regex, action: RewriteAction) -> Self {
        Self {
            pattern,
            action: Some(action),
        }
    }

    /// Build a watcher whose action expands a `$1`-style replacement
    /// template.
    pub fn with_template(pattern: Regex, template: impl Into<String>) -> Self {
        let template = template.into();
        let action: RewriteAction = Box::new(move |caps: &Captures| {
            let mut out = String::new();
            caps.expand(&template, &mut out);
            out
        });
        Self::with_action(pattern, action)
    }

    /// Match a candidate path, returning the captures on success.
    pub fn captures<'t>(&self, path: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(path)
    }

    /// Apply the rewrite action to a match, if one is configured.
    pub fn rewrite(&self, caps: &Captures) -> Option<String> {
        self.action.as_ref().map(|action| action(caps))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Compile the `[[watcher]]` config entries into watchers, in order.
pub fn build_watchers(configs: &[WatcherConfig]) -> Result<Vec<Watcher>> {
    let mut watchers = Vec::with_capacity(configs.len());

    for cfg in configs {
        let regex = Regex::new(&cfg.pattern)
            .with_context(|| format!("compiling watcher pattern {:?}", cfg.pattern))?;

        let watcher = match &cfg.rewrite {
            Some(template) => Watcher::with_template(regex, template.clone()),
            None => Watcher::new(regex),
        };
        watchers.push(watcher);
    }

    Ok(watchers)
}

/// Select the candidate paths that match at least one watcher.
///
/// Watchers with a rewrite action substitute the action's return value for
/// the original path. Multiple inputs mapping to the same output collapse to
/// one entry, preserving first-seen order. Pure function of
/// (candidates, watchers).
pub fn select_paths<'a, I>(candidates: I, watchers: &[Watcher]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut selected: Vec<String> = Vec::new();

    for path in candidates {
        for watcher in watchers {
            if let Some(caps) = watcher.captures(path) {
                let resolved = watcher
                    .rewrite(&caps)
                    .unwrap_or_else(|| path.to_string());
                if !selected.contains(&resolved) {
                    selected.push(resolved);
                }
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher(pattern: &str) -> Watcher {
        Watcher::new(Regex::new(pattern).unwrap())
    }

    #[test]
    fn selects_matching_paths_in_order() {
        let watchers = vec![watcher(r"^yes/.+\.less$")];
        let selected = select_paths(
            ["yes/a.less", "no/c.less", "yes/b.less"],
            &watchers,
        );
        assert_eq!(selected, vec!["yes/a.less", "yes/b.less"]);
    }

    #[test]
    fn rewrite_action_substitutes_the_path() {
        let watchers = vec![Watcher::with_template(
            Regex::new(r"^yes/(.+)\.less$").unwrap(),
            "yep/$1.less",
        )];
        let selected = select_paths(["yes/a.less", "yes/b.less"], &watchers);
        assert_eq!(selected, vec!["yep/a.less", "yep/b.less"]);
    }

    #[test]
    fn many_to_one_rewrite_collapses_to_a_single_entry() {
        let watchers = vec![Watcher::with_action(
            Regex::new(r"^yes/(.+)\.less$").unwrap(),
            Box::new(|_| "base.less".to_string()),
        )];
        let selected = select_paths(["yes/a.less", "yes/b.less"], &watchers);
        assert_eq!(selected, vec!["base.less"]);
    }
}
