//! Architecture guard for the design desk backend.
//!
//! Every file under `backend/src/{domain,inbound,outbound}` is parsed with
//! `syn` and checked against two families of rule:
//!
//! - layer boundaries: which sibling layers and third-party crates a file
//!   may name;
//! - workflow placement: the status rules run only where the application
//!   row is locked, stored applications are rebuilt only by adapters, and
//!   each adapter side speaks to the domain through its own kind of port.
//!
//! Run it with `cargo run -p architecture-lint [BACKEND_DIR]`.

mod layer;
mod rules;
mod scan;
mod sources;

use std::collections::BTreeSet;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

pub use layer::{Layer, Placement};
pub use rules::RuleId;
pub use sources::{LintSource, collect_sources};

/// One broken rule in one file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    /// Path relative to `backend/src`.
    pub file: Utf8PathBuf,
    pub rule: RuleId,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.file, self.rule.code(), self.detail)
    }
}

/// Every violation found in one run, sorted by file then rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} architecture violation(s):", self.0.len())?;
        for violation in &self.0 {
            writeln!(f, "  {violation}")?;
        }
        Ok(())
    }
}

/// Reasons a lint run fails.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("failed to read backend sources: {0}")]
    Io(#[from] std::io::Error),
    #[error("{file} is not valid UTF-8 as a path")]
    NonUtf8Path { file: String },
    #[error("{file} sits outside domain, inbound and outbound")]
    Unplaced { file: Utf8PathBuf },
    #[error("failed to parse {file}: {reason}")]
    Parse { file: Utf8PathBuf, reason: String },
    #[error("{0}")]
    Violations(Violations),
}

/// Lint the sources of the backend crate rooted at `backend_dir`.
///
/// Returns the number of files checked when every rule holds.
pub fn lint_backend(backend_dir: &Utf8Path) -> Result<usize, LintError> {
    let sources = collect_sources(&backend_dir.join("src"))?;
    lint_sources(&sources)?;
    Ok(sources.len())
}

/// Lint in-memory sources whose paths are relative to `backend/src`.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), LintError> {
    let mut found = BTreeSet::new();
    for source in sources {
        let placement = Placement::of(&source.file).ok_or_else(|| LintError::Unplaced {
            file: source.file.clone(),
        })?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| LintError::Parse {
            file: source.file.clone(),
            reason: err.to_string(),
        })?;
        let references = scan::references(&parsed);
        found.extend(
            rules::check(placement, &references)
                .into_iter()
                .map(|(rule, detail)| Violation {
                    file: source.file.clone(),
                    rule,
                    detail,
                }),
        );
    }
    if found.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(Violations(found.into_iter().collect())))
    }
}

#[cfg(test)]
mod tests;
