//! Depth-first traversal driving the reconciliation engine

use crate::engine::{Engine, WalkDecision};
use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Render a path the way record and exception entries are written.
///
/// A leading `.` component is dropped so that scanning the working
/// directory yields `sub/file` rather than `./sub/file`, matching how
/// baseline and exception paths are naturally spelled.
pub fn path_string(path: &Path) -> String {
    match path.strip_prefix(".") {
        Ok(stripped) if !stripped.as_os_str().is_empty() => stripped.display().to_string(),
        _ => path.display().to_string(),
    }
}

/// Walk `root` depth-first, feeding every directory and file to the engine.
///
/// Directories are offered to the engine before descent; a `SkipSubtree`
/// decision prunes the whole subtree. Entries are visited in file-name
/// order so output is stable across runs. Traversal errors are fatal.
pub fn walk(root: &Path, engine: &mut Engine) -> Result<()> {
    let mut iter = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = iter.next() {
        let entry = entry
            .with_context(|| format!("Failed to traverse directory: {}", root.display()))?;
        let path = path_string(entry.path());

        if entry.file_type().is_dir() {
            if engine.enter_directory(&path) == WalkDecision::SkipSubtree {
                iter.skip_current_dir();
            }
        } else if entry.file_type().is_file() {
            engine.visit_file(&path)?;
        }
    }

    Ok(())
}
