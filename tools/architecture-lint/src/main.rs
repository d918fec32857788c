//! `cargo run -p architecture-lint [BACKEND_DIR]`
//!
//! Lints `BACKEND_DIR/src`, defaulting to the `backend` crate beside this
//! tool in the workspace.

use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8PathBuf;

fn default_backend_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../backend")
}

fn main() -> ExitCode {
    let backend = std::env::args()
        .nth(1)
        .map_or_else(default_backend_dir, Utf8PathBuf::from);
    match architecture_lint::lint_backend(&backend) {
        Ok(checked) => {
            let _ = writeln!(io::stdout().lock(), "{checked} files respect the architecture");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = writeln!(io::stderr().lock(), "{backend}: {err}");
            ExitCode::FAILURE
        }
    }
}
