//! Exact-match path exclusion list

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Paths excluded from traversal and digesting.
///
/// Entries are exact string matches, not prefixes or globs. The list is
/// seeded once at startup (file content plus the baseline's own path and,
/// if given, the exception file's own path) and never changes afterwards.
#[derive(Debug, Default)]
pub struct ExceptionList {
    entries: Vec<String>,
}

impl ExceptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one path per line; blank lines are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open exception file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line
                .with_context(|| format!("Failed to read exception file: {}", path.display()))?;
            let line = line.trim();
            if !line.is_empty() {
                entries.push(line.to_string());
            }
        }

        Ok(Self { entries })
    }

    pub fn push(&mut self, path: impl Into<String>) {
        self.entries.push(path.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_skips_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("exceptions");
        fs::write(&file_path, "a/path\n\n  \nb/path\n").unwrap();

        let list = ExceptionList::load(&file_path).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("a/path"));
        assert!(list.contains("b/path"));
    }

    #[test]
    fn test_exact_match_only() {
        let mut list = ExceptionList::new();
        list.push("a/path");

        assert!(list.contains("a/path"));
        assert!(!list.contains("a/path/nested"));
        assert!(!list.contains("a"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ExceptionList::load(&temp_dir.path().join("nope")).is_err());
    }
}
