//! Classification output and run statistics

use anyhow::Result;
use colored::*;
use serde::Serialize;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,   // Only errors
    Normal,  // Classification lines and summary
    Verbose, // Plus database bookkeeping details
}

/// Terminal classification of one path during a run.
///
/// The fixed-width tags are an observable contract: consumers script
/// against `<TAG> <path>` lines, so the tags (including padding) must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Skipping,
    New,
    Equal,
    Modified,
    Deleted,
}

impl Classification {
    pub fn tag(self) -> &'static str {
        match self {
            Classification::Skipping => "SKIPPING",
            Classification::New => "NEW     ",
            Classification::Equal => "EQUAL   ",
            Classification::Modified => "MODIFIED",
            Classification::Deleted => "DELETED ",
        }
    }

    fn colored_tag(self) -> ColoredString {
        match self {
            Classification::Skipping => self.tag().cyan(),
            Classification::New => self.tag().green(),
            Classification::Equal => self.tag().normal(),
            Classification::Modified => self.tag().yellow(),
            Classification::Deleted => self.tag().red(),
        }
    }
}

/// Counters accumulated over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub new: usize,
    pub equal: usize,
    pub modified: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub files_hashed: usize,
    pub bytes_hashed: u64,
}

impl RunStats {
    /// True when the tree diverged from the baseline in any way.
    pub fn has_changes(&self) -> bool {
        self.new > 0 || self.modified > 0 || self.deleted > 0
    }
}

/// Emits classification lines and collects statistics for one run.
pub struct Reporter {
    mode: OutputMode,
    stats: RunStats,
}

impl Reporter {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            stats: RunStats::default(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn classify(&mut self, classification: Classification, path: &str) {
        match classification {
            Classification::Skipping => self.stats.skipped += 1,
            Classification::New => self.stats.new += 1,
            Classification::Equal => self.stats.equal += 1,
            Classification::Modified => self.stats.modified += 1,
            Classification::Deleted => self.stats.deleted += 1,
        }
        if self.mode != OutputMode::Quiet {
            println!("{} {}", classification.colored_tag(), path);
        }
    }

    pub fn record_hashed(&mut self, bytes: u64) {
        self.stats.files_hashed += 1;
        self.stats.bytes_hashed += bytes;
    }

    /// Bookkeeping detail, shown only in verbose mode.
    pub fn info(&self, message: impl AsRef<str>) {
        if self.mode == OutputMode::Verbose {
            println!("{}", message.as_ref().dimmed());
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }
}

/// Warn on stderr without aborting the run.
pub fn warn(message: &str) {
    eprintln!("{} {}", "Warning:".yellow(), message);
}

/// Print the human-readable end-of-run summary.
pub fn print_summary(stats: &RunStats, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    println!(
        "\n{} {} new, {} modified, {} deleted, {} equal, {} skipped",
        "Summary:".bold(),
        stats.new,
        stats.modified,
        stats.deleted,
        stats.equal,
        stats.skipped
    );
    println!(
        "Hashed {} file(s) ({})",
        stats.files_hashed,
        bytesize::to_string(stats.bytes_hashed, true)
    );
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    version: String,
    timestamp: String,
    summary: &'a RunStats,
}

/// Print the run summary as JSON for scripting.
pub fn print_json_summary(stats: &RunStats) -> Result<()> {
    let results = JsonSummary {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        summary: stats,
    };
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
