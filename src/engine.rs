//! Per-file reconciliation against the baseline
//!
//! The engine receives every directory and file from the traversal, decides
//! one of five classifications (SKIPPING, NEW, EQUAL, MODIFIED, DELETED),
//! and mutates the baseline accordingly. The three operation modes share
//! the same hooks and differ only in how much they trust existing records:
//!
//! - index rebuilds the baseline from scratch, hashing everything
//! - update hashes only unknown paths and trusts existing records without
//!   re-verifying their digests
//! - analyze re-hashes known paths to compare, never mutating the file
//!
//! Deletions are never decided per file; whatever remains unconfirmed in
//! the baseline when the traversal ends is deleted.

use crate::baseline::Baseline;
use crate::exceptions::ExceptionList;
use crate::hasher::FileHasher;
use crate::report::{self, Classification, Reporter, RunStats};
use anyhow::Result;
use std::path::Path;

/// Operation mode of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Build a fresh baseline; every file is NEW.
    Index,
    /// Refresh the baseline, report deletions, persist.
    Update,
    /// Compare against the baseline without touching it.
    Analyze,
}

/// Whether the traversal should descend into a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDecision {
    Continue,
    SkipSubtree,
}

pub struct Engine {
    mode: Mode,
    baseline: Baseline,
    exceptions: ExceptionList,
    hasher: FileHasher,
    reporter: Reporter,
}

impl Engine {
    pub fn new(
        mode: Mode,
        baseline: Baseline,
        exceptions: ExceptionList,
        reporter: Reporter,
    ) -> Self {
        Self {
            mode,
            baseline,
            exceptions,
            hasher: FileHasher::new(),
            reporter,
        }
    }

    /// Directory pre-visit hook. An exact exception match prunes the whole
    /// subtree.
    pub fn enter_directory(&mut self, path: &str) -> WalkDecision {
        if self.exceptions.contains(path) {
            self.reporter.classify(Classification::Skipping, path);
            WalkDecision::SkipSubtree
        } else {
            WalkDecision::Continue
        }
    }

    /// File visit hook. Digesting only happens when the mode actually needs
    /// it; hashing is the expensive operation here.
    pub fn visit_file(&mut self, path: &str) -> Result<()> {
        if self.exceptions.contains(path) {
            self.reporter.classify(Classification::Skipping, path);
            return Ok(());
        }

        match self.mode {
            Mode::Index => {
                let digest = self.digest(path)?;
                self.baseline.insert_and_mark(path, &digest);
                self.reporter.classify(Classification::New, path);
            }
            Mode::Update => {
                if self.baseline.lookup(path).is_none() {
                    let digest = self.digest(path)?;
                    self.baseline.insert_and_mark(path, &digest);
                    self.reporter.classify(Classification::New, path);
                } else {
                    // Existing record is trusted as-is; no re-hash, no line.
                    self.baseline.mark_seen(path);
                }
            }
            Mode::Analyze => match self.baseline.lookup(path) {
                None => {
                    // Nothing to compare against; skip the expensive hash.
                    self.reporter.classify(Classification::New, path);
                }
                Some(recorded) => {
                    let recorded = recorded.to_string();
                    let digest = self.digest(path)?;
                    if digest.eq_ignore_ascii_case(&recorded) {
                        self.reporter.classify(Classification::Equal, path);
                    } else {
                        self.reporter.classify(Classification::Modified, path);
                    }
                    self.baseline.mark_seen(path);
                }
            },
        }

        Ok(())
    }

    /// End-of-run hook after a successful traversal: report deletions,
    /// drop them from a writable store, persist, and return the run
    /// statistics.
    pub fn finalize(mut self) -> RunStats {
        if matches!(self.mode, Mode::Update | Mode::Analyze) {
            let mut deleted = self.baseline.unmarked_paths();
            deleted.sort();
            for path in deleted {
                self.reporter.classify(Classification::Deleted, &path);
            }
            if self.mode == Mode::Update {
                // Deleted records must not be resurrected by the persist.
                self.baseline.drop_unmarked();
            }
        }

        close_store(self.baseline, &self.reporter);
        self.reporter.into_stats()
    }

    /// Cleanup when the traversal failed: still close the store, but skip
    /// the deletion phase since the traversal was incomplete.
    pub fn abort(self) {
        close_store(self.baseline, &self.reporter);
    }

    fn digest(&mut self, path: &str) -> Result<String> {
        let (digest, bytes) = self.hasher.digest_file(Path::new(path))?;
        self.reporter.record_hashed(bytes);
        Ok(digest)
    }
}

/// A close failure degrades to a warning; mode cleanup always completes.
fn close_store(baseline: Baseline, reporter: &Reporter) {
    let writable = baseline.is_writable();
    let path = baseline.path().display().to_string();
    match baseline.close() {
        Ok(count) if writable => {
            reporter.info(format!("Wrote {} entries to baseline {}", count, path));
        }
        Ok(_) => {}
        Err(e) => report::warn(&format!("Cannot close baseline: {:#}", e)),
    }
}
