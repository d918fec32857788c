//! Where a file sits in the backend.

use camino::Utf8Path;

/// Hexagonal layer owning a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    pub const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    /// Module name of the layer under `backend/src`.
    pub const fn module(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    pub fn from_module(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.module() == name)
    }
}

/// A file's layer plus the facts the placement rules key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub layer: Layer,
    /// Inside `domain/application/`, which owns the workflow rules.
    pub workflow_home: bool,
    /// Test-only file such as `tests.rs`, `*_tests.rs` or `test_utils.rs`.
    pub test_file: bool,
}

impl Placement {
    /// Classify a path relative to `backend/src`.
    pub fn of(path: &Utf8Path) -> Option<Self> {
        let mut components = path.components().map(|part| part.as_str());
        let layer = Layer::from_module(components.next()?)?;
        let workflow_home = layer == Layer::Domain && components.next() == Some("application");
        let test_file = path.iter().any(|part| part == "tests")
            || path.file_stem().is_some_and(|stem| {
                stem == "tests" || stem == "test_utils" || stem.ends_with("_tests")
            });
        Some(Self {
            layer,
            workflow_home,
            test_file,
        })
    }
}
