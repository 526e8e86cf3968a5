// src/less/compiler.rs

//! A small LESS renderer.
//!
//! Covers the subset this tool needs to compile typical watched stylesheets
//! standalone: `@name: value;` variable declarations, `@import "name";`
//! directives resolved against the configured search paths, and flat
//! `selector { prop: value; ... }` rule sets with variable substitution in
//! values. Nested rule sets, mixins and expressions are out of scope; a
//! source using them fails with a `CompileError` that the orchestrator
//! reports per file.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::{
    CompileError, CompileRequest, Compiler, STYLESHEET_EXTENSIONS, has_stylesheet_extension,
};

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^@import\s+['"]([^'"]+)['"]"#).expect("import regex is valid")
});

static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^@([A-Za-z][A-Za-z0-9_-]*)\s*:\s*(.+)$").expect("variable regex is valid")
});

static VARIABLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z][A-Za-z0-9_-]*)").expect("variable reference regex is valid")
});

/// Rendering flags, as passed through from the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub compress: bool,
    pub yuicompress: bool,
}

/// Parser context for one source file: where it lives and where its imports
/// may be found.
#[derive(Debug, Clone)]
pub struct Parser {
    search_paths: Vec<PathBuf>,
    filename: PathBuf,
}

#[derive(Debug, Clone)]
struct Rule {
    selector: String,
    declarations: Vec<(String, String)>,
}

/// A parsed stylesheet, ready to render.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Parser {
    pub fn new(search_paths: Vec<PathBuf>, filename: impl Into<PathBuf>) -> Self {
        Self {
            search_paths,
            filename: filename.into(),
        }
    }

    /// Parse full source text into a renderable tree.
    pub fn parse(&self, text: &str) -> Result<Stylesheet, CompileError> {
        let mut sheet = Stylesheet::default();
        let mut scope = HashMap::new();
        let mut seen = vec![self.filename.clone()];
        self.parse_into(text, &mut sheet, &mut scope, &mut seen)?;
        Ok(sheet)
    }

    fn parse_into(
        &self,
        text: &str,
        sheet: &mut Stylesheet,
        scope: &mut HashMap<String, String>,
        seen: &mut Vec<PathBuf>,
    ) -> Result<(), CompileError> {
        let text = strip_comments(text);
        let mut rest = text.as_str();

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let semi = rest.find(';');
            let brace = rest.find('{');

            match (semi, brace) {
                (Some(s), b) if b.map_or(true, |b| s < b) => {
                    self.statement(rest[..s].trim(), sheet, scope, seen)?;
                    rest = &rest[s + 1..];
                }
                (_, Some(b)) => {
                    let selector = rest[..b].trim();
                    let close = find_matching_brace(rest, b).ok_or_else(|| {
                        CompileError::Syntax {
                            message: format!("unbalanced braces after selector '{selector}'"),
                        }
                    })?;
                    self.rule(selector, &rest[b + 1..close], sheet, scope)?;
                    rest = &rest[close + 1..];
                }
                // The first arm's guard always holds when `brace` is None,
                // so only the semicolon-free case reaches here.
                (_, None) => {
                    return Err(CompileError::Syntax {
                        message: format!("unterminated statement near '{}'", snippet(rest)),
                    });
                }
            }
        }

        Ok(())
    }

    fn statement(
        &self,
        statement: &str,
        sheet: &mut Stylesheet,
        scope: &mut HashMap<String, String>,
        seen: &mut Vec<PathBuf>,
    ) -> Result<(), CompileError> {
        if let Some(caps) = IMPORT_RE.captures(statement) {
            let name = caps[1].to_string();
            return self.import(&name, sheet, scope, seen);
        }

        if let Some(caps) = VARIABLE_RE.captures(statement) {
            let value = substitute(scope, caps[2].trim())?;
            scope.insert(caps[1].to_string(), value);
            return Ok(());
        }

        Err(CompileError::Syntax {
            message: format!(
                "expected a variable declaration, @import or rule set near '{}'",
                snippet(statement)
            ),
        })
    }

    fn import(
        &self,
        name: &str,
        sheet: &mut Stylesheet,
        scope: &mut HashMap<String, String>,
        seen: &mut Vec<PathBuf>,
    ) -> Result<(), CompileError> {
        let path = self
            .resolve_import(name)
            .ok_or_else(|| CompileError::MissingImport {
                name: name.to_string(),
            })?;

        // Cycle guard: a file importing itself (directly or transitively)
        // is inlined only once.
        if seen.contains(&path) {
            return Ok(());
        }
        seen.push(path.clone());

        let text = fs::read_to_string(&path).map_err(|source| CompileError::Read {
            path: path.clone(),
            source,
        })?;
        self.parse_into(&text, sheet, scope, seen)
    }

    fn resolve_import(&self, name: &str) -> Option<PathBuf> {
        let candidates: Vec<String> = if has_stylesheet_extension(name) {
            vec![name.to_string()]
        } else {
            STYLESHEET_EXTENSIONS
                .iter()
                .map(|ext| format!("{name}.{ext}"))
                .collect()
        };

        for dir in &self.search_paths {
            for candidate in &candidates {
                let path = dir.join(candidate);
                if path.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }

    fn rule(
        &self,
        selector: &str,
        body: &str,
        sheet: &mut Stylesheet,
        scope: &HashMap<String, String>,
    ) -> Result<(), CompileError> {
        if body.contains('{') {
            return Err(CompileError::Syntax {
                message: format!("nested rule sets are not supported (in '{selector}')"),
            });
        }

        let selector = selector.split_whitespace().collect::<Vec<_>>().join(" ");
        if selector.is_empty() {
            return Err(CompileError::Syntax {
                message: "rule set without a selector".to_string(),
            });
        }

        let mut declarations = Vec::new();
        for decl in body.split(';') {
            let decl = decl.trim();
            if decl.is_empty() {
                continue;
            }
            let Some((prop, value)) = decl.split_once(':') else {
                return Err(CompileError::Syntax {
                    message: format!("declaration '{}' is missing ':'", snippet(decl)),
                });
            };
            declarations.push((prop.trim().to_string(), substitute(scope, value.trim())?));
        }

        sheet.rules.push(Rule {
            selector,
            declarations,
        });
        Ok(())
    }
}

impl Stylesheet {
    /// Render to CSS text.
    pub fn render(&self, options: &RenderOptions) -> String {
        if options.yuicompress {
            self.render_compact("")
        } else if options.compress {
            self.render_compact("\n")
        } else {
            self.render_expanded()
        }
    }

    fn render_expanded(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            out.push_str(&rule.selector);
            out.push_str(" {\n");
            for (prop, value) in &rule.declarations {
                out.push_str("  ");
                out.push_str(prop);
                out.push_str(": ");
                out.push_str(value);
                out.push_str(";\n");
            }
            out.push_str("}\n");
        }
        out
    }

    fn render_compact(&self, separator: &str) -> String {
        let mut parts = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let decls: Vec<String> = rule
                .declarations
                .iter()
                .map(|(prop, value)| format!("{prop}:{value}"))
                .collect();
            parts.push(format!("{}{{{}}}", rule.selector, decls.join(";")));
        }
        let mut out = parts.join(separator);
        if !out.is_empty() && !separator.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// The bundled compiler: read, parse, render.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessCompiler;

impl Compiler for LessCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<String, CompileError> {
        let text =
            fs::read_to_string(&request.filename).map_err(|source| CompileError::Read {
                path: request.filename.clone(),
                source,
            })?;

        let parser = Parser::new(request.search_paths.clone(), request.filename.clone());
        let sheet = parser.parse(&text)?;

        Ok(sheet.render(&RenderOptions {
            compress: request.compress,
            yuicompress: request.yuicompress,
        }))
    }
}

/// Substitute `@name` references in a value from the current scope.
fn substitute(
    scope: &HashMap<String, String>,
    value: &str,
) -> Result<String, CompileError> {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for caps in VARIABLE_REF_RE.captures_iter(value) {
        let whole = caps.get(0).expect("group 0 always matches");
        let name = &caps[1];
        let Some(resolved) = scope.get(name) else {
            return Err(CompileError::UndefinedVariable {
                name: name.to_string(),
            });
        };
        out.push_str(&value[last..whole.start()]);
        out.push_str(resolved);
        last = whole.end();
    }

    out.push_str(&value[last..]);
    Ok(out)
}

/// Remove `/* ... */` and `// ...` comments.
///
/// Quoted strings are preserved; `//` only starts a comment outside
/// parentheses so `url(http://...)` survives.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string: Option<char> = None;
    let mut paren_depth = 0usize;

    while let Some((_, c)) = chars.next() {
        if let Some(quote) = in_string {
            out.push(c);
            if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = Some(c);
                out.push(c);
            }
            '(' => {
                paren_depth += 1;
                out.push(c);
            }
            ')' => {
                paren_depth = paren_depth.saturating_sub(1);
                out.push(c);
            }
            '/' => match chars.peek().map(|&(_, next)| next) {
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for (_, next) in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                }
                Some('/') if paren_depth == 0 => {
                    chars.next();
                    for (_, next) in chars.by_ref() {
                        if next == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }

    out
}

/// Index of the `}` matching the `{` at byte offset `open`, or `None` when
/// the braces are unbalanced.
fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().skip_while(|&(i, _)| i < open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn snippet(s: &str) -> String {
    s.chars().take(40).collect()
}
