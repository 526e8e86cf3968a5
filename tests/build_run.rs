use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use regex::Regex;
use tempfile::TempDir;

use watchless::build::{Builder, Watcher};
use watchless::config::Options;
use watchless::less::{CompileError, CompileRequest, Compiler};
use watchless::ui::MemoryUi;

type TestResult = Result<(), Box<dyn Error>>;

const STUB_LESS: &str = "@color: #4D926F;\n\n#header {\n  color: @color;\n}\n";

fn write_file(root: &Path, rel: &str, contents: &str) -> TestResult {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn watcher(pattern: &str) -> Watcher {
    Watcher::new(Regex::new(pattern).unwrap())
}

fn builder(root: &TempDir, options: Options, watchers: Vec<Watcher>) -> (Builder, Arc<MemoryUi>) {
    let ui = Arc::new(MemoryUi::new());
    let builder = Builder::new(options, watchers, root.path()).with_ui(ui.clone());
    (builder, ui)
}

/// Compiler test double that fails for one configured basename and records
/// every invocation.
struct FlakyCompiler {
    fail_on: &'static str,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Compiler for FlakyCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<String, CompileError> {
        let name = request
            .filename
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(name.clone());
        if name == self.fail_on {
            return Err(CompileError::Syntax {
                message: "boom".to_string(),
            });
        }
        Ok("/* compiled */\n".to_string())
    }
}

#[test]
fn produces_css_from_less() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;

    let (builder, _ui) = builder(&root, Options::default(), vec![watcher(r"^yes/.+\.less$")]);
    assert!(builder.run(&["yes/a.less".to_string()])?);

    let css = fs::read_to_string(root.path().join("yes/a.css"))?;
    assert!(css.to_lowercase().contains("color: #4d926f;"));

    Ok(())
}

#[test]
fn produces_css_in_same_nested_hierarchy_as_less() -> TestResult {
    let root = tempfile::tempdir()?;
    let path = "yes/we/can/have/nested/directories/a.less";
    write_file(root.path(), path, STUB_LESS)?;

    let (builder, _ui) = builder(&root, Options::default(), vec![watcher(r"^yes/.+\.less$")]);
    builder.run(&[path.to_string()])?;

    assert!(
        root.path()
            .join("yes/we/can/have/nested/directories/a.css")
            .exists()
    );

    Ok(())
}

#[test]
fn mirrors_capture_subpath_under_output_root() -> TestResult {
    let root = tempfile::tempdir()?;
    let path = "src/we/have/nested/a.less";
    write_file(root.path(), path, STUB_LESS)?;

    let options = Options {
        output: Some("public".into()),
        ..Options::default()
    };
    let (builder, _ui) = builder(&root, options, vec![watcher(r"^src/(.+\.less)$")]);
    builder.run(&[path.to_string()])?;

    assert!(root.path().join("public/we/have/nested/a.css").exists());

    Ok(())
}

#[test]
fn partials_are_never_compiled() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/_partial.less", STUB_LESS)?;

    let (builder, ui) = builder(&root, Options::default(), vec![watcher(r"^yes/.+\.less$")]);
    assert!(builder.run(&["yes/_partial.less".to_string()])?);

    assert!(!root.path().join("yes/_partial.css").exists());
    assert!(ui.messages().is_empty());

    Ok(())
}

#[test]
fn misconfigured_css_watcher_does_not_overwrite_the_original() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.css", "#header { color: red; }\n")?;
    let before = fs::read_to_string(root.path().join("yes/a.css"))?;

    let (builder, ui) = builder(&root, Options::default(), vec![watcher(r"^yes/.+\.css$")]);
    builder.run(&["yes/a.css".to_string()])?;

    assert!(
        ui.messages()
            .iter()
            .any(|m| m.contains("would overwrite the original"))
    );
    assert_eq!(fs::read_to_string(root.path().join("yes/a.css"))?, before);

    Ok(())
}

#[test]
fn same_rewritten_path_is_compiled_only_once() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;

    let calls = Arc::new(Mutex::new(Vec::new()));
    let compiler = FlakyCompiler {
        fail_on: "never",
        calls: calls.clone(),
    };

    // Two watchers both matching the same source must not produce a
    // duplicate (destination, source) pair.
    let watchers = vec![watcher(r"^yes/.+\.less$"), watcher(r"^yes/a\..+$")];
    let ui = Arc::new(MemoryUi::new());
    let builder = Builder::new(Options::default(), watchers, root.path())
        .with_ui(ui.clone())
        .with_compiler(Box::new(compiler));

    assert!(builder.run(&["yes/a.less".to_string()])?);
    assert_eq!(calls.lock().unwrap().len(), 1);

    Ok(())
}

#[test]
fn a_failing_file_does_not_abort_the_batch() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;
    write_file(root.path(), "yes/b.less", STUB_LESS)?;
    write_file(root.path(), "yes/c.less", STUB_LESS)?;

    let calls = Arc::new(Mutex::new(Vec::new()));
    let compiler = FlakyCompiler {
        fail_on: "b.less",
        calls: calls.clone(),
    };

    let ui = Arc::new(MemoryUi::new());
    let builder = Builder::new(
        Options::default(),
        vec![watcher(r"^yes/.+\.less$")],
        root.path(),
    )
    .with_ui(ui.clone())
    .with_compiler(Box::new(compiler));

    let paths: Vec<String> = ["yes/a.less", "yes/b.less", "yes/c.less"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let success = builder.run(&paths)?;

    assert!(!success);
    assert_eq!(
        calls.lock().unwrap().clone(),
        vec!["a.less", "b.less", "c.less"]
    );
    assert!(root.path().join("yes/a.css").exists());
    assert!(!root.path().join("yes/b.css").exists());
    assert!(root.path().join("yes/c.css").exists());
    assert!(
        ui.messages()
            .iter()
            .any(|m| m.contains("failed with message"))
    );

    Ok(())
}

#[test]
fn run_on_changes_honours_all_after_change() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;
    write_file(root.path(), "yes/b.less", STUB_LESS)?;

    // all_after_change = true: any notification rebuilds everything.
    let (builder, _ui) = builder(&root, Options::default(), vec![watcher(r"^yes/.+\.less$")]);
    builder.run_on_changes(&["yes/a.less".to_string()])?;
    assert!(root.path().join("yes/a.css").exists());
    assert!(root.path().join("yes/b.css").exists());

    Ok(())
}

#[test]
fn run_on_changes_builds_only_the_reported_subset_when_disabled() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;
    write_file(root.path(), "yes/b.less", STUB_LESS)?;

    let options = Options {
        all_after_change: false,
        ..Options::default()
    };
    let (builder, _ui) = builder(&root, options, vec![watcher(r"^yes/.+\.less$")]);
    builder.run_on_changes(&["yes/a.less".to_string()])?;

    assert!(root.path().join("yes/a.css").exists());
    assert!(!root.path().join("yes/b.css").exists());

    Ok(())
}

#[test]
fn start_runs_a_full_build_when_configured() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;
    write_file(root.path(), "no/c.less", STUB_LESS)?;

    let (builder, ui) = builder(&root, Options::default(), vec![watcher(r"^yes/.+\.less$")]);
    builder.start()?;

    assert!(
        ui.messages()
            .iter()
            .any(|m| m.contains("is on the job"))
    );
    assert!(root.path().join("yes/a.css").exists());
    assert!(!root.path().join("no/c.css").exists());

    Ok(())
}

#[test]
fn start_skips_the_full_build_when_disabled() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;

    let options = Options {
        all_on_start: false,
        ..Options::default()
    };
    let (builder, _ui) = builder(&root, options, vec![watcher(r"^yes/.+\.less$")]);
    builder.start()?;

    assert!(!root.path().join("yes/a.css").exists());

    Ok(())
}

#[test]
fn compress_option_reaches_the_renderer() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "yes/a.less", STUB_LESS)?;

    let options = Options {
        compress: true,
        ..Options::default()
    };
    let (builder, _ui) = builder(&root, options, vec![watcher(r"^yes/.+\.less$")]);
    builder.run(&["yes/a.less".to_string()])?;

    let css = fs::read_to_string(root.path().join("yes/a.css"))?;
    assert_eq!(css, "#header{color:#4D926F}\n");

    Ok(())
}

#[test]
fn import_paths_option_extends_the_search_paths() -> TestResult {
    let root = tempfile::tempdir()?;
    write_file(root.path(), "lib/styles/palette.less", "@color: #4D926F;\n")?;
    write_file(
        root.path(),
        "yes/a.less",
        "@import \"palette\";\n#header { color: @color; }\n",
    )?;

    let options = Options {
        import_paths: vec!["lib/styles".into()],
        ..Options::default()
    };
    let (builder, _ui) = builder(&root, options, vec![watcher(r"^yes/.+\.less$")]);
    assert!(builder.run(&["yes/a.less".to_string()])?);

    let css = fs::read_to_string(root.path().join("yes/a.css"))?;
    assert!(css.contains("color: #4D926F;"));

    Ok(())
}
