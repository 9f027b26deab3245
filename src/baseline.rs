//! Persistent path-to-digest baseline with mark-and-sweep reconciliation
//!
//! The baseline is a flat text file, one `<digest> <path>` record per line.
//! In memory it is split into two disjoint partitions keyed by path: `live`
//! holds records loaded from disk that have not been confirmed by the
//! current traversal, `marked` holds records confirmed present (carried over
//! or freshly inserted). Whatever survives in `live` when the traversal ends
//! is a deletion.

use crate::report;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default baseline filename in the working directory.
pub const DEFAULT_FILENAME: &str = "sha1sum";

pub struct Baseline {
    path: PathBuf,
    writable: bool,
    live: HashMap<String, String>,
    marked: HashMap<String, String>,
}

impl Baseline {
    /// Create a fresh, empty baseline, truncating any existing file.
    ///
    /// This is index semantics: the previous content does not need
    /// preserving.
    pub fn create(path: &Path) -> Result<Self> {
        File::create(path)
            .with_context(|| format!("Failed to create baseline: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            writable: true,
            live: HashMap::new(),
            marked: HashMap::new(),
        })
    }

    /// Open an existing baseline, loading every record into the live
    /// partition.
    ///
    /// A record line is `<digest><whitespace><path>`, split on the first
    /// whitespace run. Lines without a separator are warned about and
    /// skipped; blank lines are ignored.
    pub fn open(path: &Path, writable: bool) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open baseline: {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut live = HashMap::new();
        for line in reader.lines() {
            let line =
                line.with_context(|| format!("Failed to read baseline: {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(char::is_whitespace) {
                Some((digest, rest)) if !rest.trim().is_empty() => {
                    live.insert(rest.trim().to_string(), digest.trim().to_string());
                }
                _ => report::warn(&format!("Invalid baseline line: {}", line)),
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            writable,
            live,
            marked: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Total number of records across both partitions.
    pub fn len(&self) -> usize {
        self.live.len() + self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.marked.is_empty()
    }

    /// Look up a digest without confirming the path as seen.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.live
            .get(path)
            .or_else(|| self.marked.get(path))
            .map(String::as_str)
    }

    /// Confirm a path as present in the current traversal.
    ///
    /// Moves the record from live to marked if it was live, otherwise
    /// returns the digest already marked. Idempotent.
    pub fn mark_seen(&mut self, path: &str) -> Option<String> {
        if let Some(digest) = self.live.remove(path) {
            self.marked.insert(path.to_string(), digest.clone());
            Some(digest)
        } else {
            self.marked.get(path).cloned()
        }
    }

    /// Insert or overwrite a record directly in the marked partition,
    /// returning whichever prior digest existed.
    ///
    /// A path resolving in both partitions at once is a programming error,
    /// not a user-facing condition.
    pub fn insert_and_mark(&mut self, path: &str, digest: &str) -> Option<String> {
        let old_live = self.live.remove(path);
        let old_marked = self.marked.insert(path.to_string(), digest.to_string());
        debug_assert!(
            old_live.is_none() || old_marked.is_none(),
            "path present in both partitions: {}",
            path
        );
        old_live.or(old_marked)
    }

    /// Remove a record from whichever partition holds it.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.live
            .remove(path)
            .or_else(|| self.marked.remove(path))
    }

    /// Paths not confirmed by the current traversal, i.e. the deletions.
    pub fn unmarked_paths(&self) -> Vec<String> {
        self.live.keys().cloned().collect()
    }

    /// Clear the live partition so deleted records are not persisted.
    pub fn drop_unmarked(&mut self) {
        self.live.clear();
    }

    /// Persist the union of both partitions if writable, returning the
    /// number of records written. Closing a read-only baseline writes
    /// nothing.
    pub fn close(self) -> Result<usize> {
        if !self.writable {
            return Ok(0);
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to write baseline: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        let mut count = 0;
        for (path, digest) in self.live.iter().chain(self.marked.iter()) {
            writeln!(writer, "{} {}", digest, path)
                .with_context(|| format!("Failed to write baseline: {}", self.path.display()))?;
            count += 1;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush baseline: {}", self.path.display()))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_truncates_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");
        fs::write(&path, "1234 a/path\n").unwrap();

        let baseline = Baseline::create(&path).unwrap();
        assert!(baseline.is_empty());
        baseline.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_partition_exclusivity() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");
        fs::write(&path, "1234 a/path\n5678 b/path\n").unwrap();

        let mut baseline = Baseline::open(&path, true).unwrap();
        assert!(baseline.live.contains_key("a/path"));

        baseline.mark_seen("a/path");
        assert!(!baseline.live.contains_key("a/path"));
        assert!(baseline.marked.contains_key("a/path"));

        baseline.insert_and_mark("b/path", "9abc");
        assert!(!baseline.live.contains_key("b/path"));
        assert_eq!(baseline.marked.get("b/path").unwrap(), "9abc");

        baseline.insert_and_mark("c/path", "def0");
        assert!(!baseline.live.contains_key("c/path"));
        assert!(baseline.marked.contains_key("c/path"));
    }

    #[test]
    fn test_mark_seen_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");

        let mut baseline = Baseline::create(&path).unwrap();
        baseline.insert_and_mark("a/path", "1234");

        assert_eq!(baseline.mark_seen("a/path").as_deref(), Some("1234"));
        assert_eq!(baseline.mark_seen("a/path").as_deref(), Some("1234"));
        assert_eq!(baseline.len(), 1);
    }

    #[test]
    fn test_lookup_does_not_mutate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");
        fs::write(&path, "1234 a/path\n").unwrap();

        let baseline = Baseline::open(&path, false).unwrap();
        assert_eq!(baseline.lookup("a/path"), Some("1234"));
        assert!(baseline.live.contains_key("a/path"));
        assert!(baseline.marked.is_empty());
        assert_eq!(baseline.lookup("missing"), None);
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");

        let mut baseline = Baseline::create(&path).unwrap();
        baseline.insert_and_mark("a/path", "1234");
        baseline.insert_and_mark("b/path", "5678");
        baseline.close().unwrap();

        let reopened = Baseline::open(&path, false).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.lookup("a/path"), Some("1234"));
        assert_eq!(reopened.lookup("b/path"), Some("5678"));
    }

    #[test]
    fn test_read_only_close_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");

        let mut baseline = Baseline::create(&path).unwrap();
        baseline.insert_and_mark("a/path", "1234");
        baseline.close().unwrap();

        let mut read_only = Baseline::open(&path, false).unwrap();
        read_only.insert_and_mark("another/path", "5678");
        assert_eq!(read_only.close().unwrap(), 0);

        let reopened = Baseline::open(&path, false).unwrap();
        assert_eq!(reopened.lookup("another/path"), None);
        assert_eq!(reopened.lookup("a/path"), Some("1234"));
    }

    #[test]
    fn test_malformed_line_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");
        fs::write(&path, "1234 a/path\nnoseparator\n5678 b/path\n\n").unwrap();

        let baseline = Baseline::open(&path, false).unwrap();
        assert_eq!(baseline.len(), 2);
        assert_eq!(baseline.lookup("a/path"), Some("1234"));
        assert_eq!(baseline.lookup("b/path"), Some("5678"));
    }

    #[test]
    fn test_path_with_internal_spaces_survives() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");

        let mut baseline = Baseline::create(&path).unwrap();
        baseline.insert_and_mark("a path/with spaces", "1234");
        baseline.close().unwrap();

        let reopened = Baseline::open(&path, false).unwrap();
        assert_eq!(reopened.lookup("a path/with spaces"), Some("1234"));
    }

    #[test]
    fn test_unmarked_and_drop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");
        fs::write(&path, "1234 a/path\n5678 b/path\n").unwrap();

        let mut baseline = Baseline::open(&path, true).unwrap();
        baseline.mark_seen("a/path");
        assert_eq!(baseline.unmarked_paths(), vec!["b/path".to_string()]);

        baseline.drop_unmarked();
        assert!(baseline.unmarked_paths().is_empty());
        assert_eq!(baseline.len(), 1);
    }

    #[test]
    fn test_remove_from_either_partition() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sha1sum");
        fs::write(&path, "1234 a/path\n").unwrap();

        let mut baseline = Baseline::open(&path, true).unwrap();
        baseline.insert_and_mark("b/path", "5678");

        assert_eq!(baseline.remove("a/path").as_deref(), Some("1234"));
        assert_eq!(baseline.remove("b/path").as_deref(), Some("5678"));
        assert_eq!(baseline.remove("b/path"), None);
        assert!(baseline.is_empty());
    }
}
