//! Loading layer sources from disk.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::LintError;
use crate::layer::Layer;

/// A Rust file to lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: Utf8PathBuf,
    pub contents: String,
}

impl LintSource {
    pub fn new(file: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contents: contents.into(),
        }
    }
}

/// Read every `.rs` file below the layer directories of `src_dir`.
///
/// Missing layer directories are skipped. Files are returned in path order.
pub fn collect_sources(src_dir: &Utf8Path) -> Result<Vec<LintSource>, LintError> {
    let root = Dir::open_ambient_dir(src_dir, ambient_authority())?;
    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let Ok(dir) = root.open_dir(layer.module()) else {
            continue;
        };
        walk(&dir, Utf8PathBuf::from(layer.module()), &mut sources)?;
    }
    sources.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(sources)
}

fn walk(dir: &Dir, relative: Utf8PathBuf, sources: &mut Vec<LintSource>) -> Result<(), LintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|raw| LintError::NonUtf8Path {
                file: format!("{relative}/{}", raw.to_string_lossy()),
            })?;
        let path = relative.join(&name);
        if entry.file_type()?.is_dir() {
            walk(&entry.open_dir()?, path, sources)?;
        } else if path.extension() == Some("rs") {
            let contents = dir.read_to_string(&name)?;
            sources.push(LintSource::new(path, contents));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn reads_layer_sources_and_skips_the_rest() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let src = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp path");
        for (file, body) in [
            ("domain/application/workflow.rs", "fn rules() {}"),
            ("outbound/memory/mod.rs", "fn store() {}"),
            ("outbound/memory/README.md", "not rust"),
            ("server/mod.rs", "fn outside() {}"),
        ] {
            let path = src.join(file);
            std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
            std::fs::write(&path, body).expect("write source");
        }

        let sources = collect_sources(&src).expect("collect");
        let files: Vec<_> = sources.iter().map(|source| source.file.as_str()).collect();
        assert_eq!(
            files,
            ["domain/application/workflow.rs", "outbound/memory/mod.rs"]
        );
        assert_eq!(sources.first().map(|s| s.contents.as_str()), Some("fn rules() {}"));
    }
}
