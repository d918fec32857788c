//! Behaviour tests running the lint over a miniature backend on disk.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;

use architecture_lint::{LintError, Violation, lint_backend};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const LAYOUT: [(&str, &str); 5] = [
    (
        "domain/application/workflow.rs",
        "pub fn apply_transition() {}\npub fn check_deletion() {}\n",
    ),
    (
        "domain/application_service.rs",
        "use crate::domain::ports::ApplicationRepository;\n\
         pub struct ApplicationService<A: ApplicationRepository> { applications: A }\n",
    ),
    (
        "inbound/http/applications.rs",
        "use crate::domain::ports::ApplicationCommand;\n\
         pub async fn transition(_service: &dyn ApplicationCommand) {}\n",
    ),
    (
        "inbound/http/state.rs",
        "use std::sync::Arc;\nuse crate::domain::ports::ApplicationQuery;\n\
         pub struct HttpState { pub applications: Arc<dyn ApplicationQuery> }\n",
    ),
    (
        "outbound/memory/mod.rs",
        "use crate::domain::{apply_transition, check_deletion};\n\
         use crate::domain::ports::ApplicationRepository;\n\
         pub struct MemoryStore;\n\
         impl MemoryStore { fn locked(&self) { apply_transition(); check_deletion(); } }\n",
    ),
];

struct LintWorld {
    files: RefCell<BTreeMap<String, String>>,
    outcome: RefCell<Option<Result<usize, LintError>>>,
}

impl LintWorld {
    fn append(&self, file: &str, line: String) {
        let mut files = self.files.borrow_mut();
        let contents = files.entry(file.to_owned()).or_default();
        contents.push_str(&line);
        contents.push('\n');
    }

    fn violations(&self) -> Vec<Violation> {
        match self.outcome.borrow().as_ref().expect("the lint ran") {
            Ok(checked) => panic!("expected violations, {checked} files passed"),
            Err(LintError::Violations(found)) => found.0.clone(),
            Err(other) => panic!("lint failed to run: {other}"),
        }
    }
}

#[fixture]
fn world() -> LintWorld {
    LintWorld {
        files: RefCell::new(BTreeMap::new()),
        outcome: RefCell::new(None),
    }
}

#[given("a backend with the design desk layout")]
fn a_backend_with_the_layout(world: &LintWorld) {
    let mut files = world.files.borrow_mut();
    for (file, contents) in LAYOUT {
        files.insert(file.to_owned(), contents.to_owned());
    }
}

#[given("the file {file} calls {function}")]
fn the_file_calls(world: &LintWorld, file: String, function: String) {
    world.append(&file, format!("pub fn added() {{ {function}(); }}"));
}

#[given("the file {file} names {port}")]
fn the_file_names(world: &LintWorld, file: String, port: String) {
    world.append(&file, format!("pub fn named(_port: &dyn {port}) {{}}"));
}

#[given("the file {file} imports {path}")]
fn the_file_imports(world: &LintWorld, file: String, path: String) {
    world.append(&file, format!("use {path};"));
}

#[when("the architecture lint runs")]
fn the_architecture_lint_runs(world: &LintWorld) {
    let tmp = TempDir::new().expect("temp dir");
    let backend = Utf8PathBuf::from_path_buf(tmp.path().join("backend")).expect("utf-8 path");
    for (file, contents) in world.files.borrow().iter() {
        let path = backend.join("src").join(file);
        fs::create_dir_all(path.parent().expect("nested path")).expect("mkdir");
        fs::write(&path, contents).expect("write source");
    }
    *world.outcome.borrow_mut() = Some(lint_backend(&backend));
}

#[then("the lint passes having checked {count} files")]
fn the_lint_passes(world: &LintWorld, count: usize) {
    match world.outcome.borrow().as_ref().expect("the lint ran") {
        Ok(checked) => assert_eq!(*checked, count),
        Err(err) => panic!("expected a clean run: {err}"),
    }
}

#[then("{file} breaks rule {rule}")]
fn the_file_breaks_rule(world: &LintWorld, file: String, rule: String) {
    let violations = world.violations();
    assert!(
        violations
            .iter()
            .any(|violation| violation.file == file.as_str() && violation.rule.code() == rule),
        "no {rule} violation in {file}: {violations:?}"
    );
}

#[then("{count} violations are reported")]
fn violations_are_reported(world: &LintWorld, count: usize) {
    assert_eq!(world.violations().len(), count);
}

#[scenario(path = "tests/features/architecture_guardrails.feature")]
fn architecture_guardrails(world: LintWorld) {
    drop(world);
}
