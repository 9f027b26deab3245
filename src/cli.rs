//! Command-line interface and run wiring

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

use crate::baseline::{self, Baseline};
use crate::engine::{Engine, Mode};
use crate::exceptions::ExceptionList;
use crate::report::{self, OutputMode, Reporter};
use crate::walker;

#[derive(Parser)]
#[command(name = "intact")]
#[command(version)]
#[command(about = "Detect new, modified, and deleted files against a digest baseline")]
#[command(long_about = "Intact records a baseline of content digests for a directory tree \
    and reports how the tree has changed since.\n\n\
    Examples:\n  \
    intact index                    # Build a fresh baseline of the working directory\n  \
    intact analyze                  # Compare the tree against the baseline, read-only\n  \
    intact update -e exceptions     # Refresh the baseline, reporting deletions\n  \
    intact index -f tree.sum photos # Index 'photos' into an explicit baseline file")]
pub struct Cli {
    /// Operation mode
    #[arg(value_enum, ignore_case = true)]
    pub mode: ModeArg,

    /// Root path to scan [default: current directory]
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Baseline file holding one "<digest> <path>" record per line
    #[arg(short = 'f', long = "file", default_value = baseline::DEFAULT_FILENAME, value_name = "FILE")]
    pub baseline: PathBuf,

    /// Exception file with one exact path to skip per line
    #[arg(short = 'e', long = "exceptions", value_name = "FILE")]
    pub exceptions: Option<PathBuf>,

    /// Print database bookkeeping details
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Output the run summary as JSON for scripting
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Build a fresh baseline, classifying every file as NEW
    Index,
    /// Refresh the baseline and report deletions
    Update,
    /// Compare against the baseline without modifying it
    Analyze,
}

/// Configuration problems surfaced before any traversal starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Exception file does not exist: {}", .0.display())]
    MissingExceptionFile(PathBuf),
    #[error("Path does not exist: {}", .0.display())]
    MissingRoot(PathBuf),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let output_mode = if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        };

        // A configuration error never starts a traversal.
        if let Some(ref exception_file) = self.exceptions {
            if !exception_file.exists() {
                return Err(ConfigError::MissingExceptionFile(exception_file.clone()).into());
            }
        }
        let root = self.path.clone().unwrap_or_else(|| PathBuf::from("."));
        if !root.exists() {
            return Err(ConfigError::MissingRoot(root).into());
        }

        let reporter = Reporter::new(output_mode);

        // The exception list always covers the baseline itself and, if
        // given, the exception file, so neither ends up in the baseline.
        let mut exceptions = match &self.exceptions {
            Some(path) => {
                let list = ExceptionList::load(path)?;
                reporter.info(format!(
                    "Read {} entries from exception file {}",
                    list.len(),
                    path.display()
                ));
                list
            }
            None => ExceptionList::new(),
        };
        if let Some(ref path) = self.exceptions {
            exceptions.push(walker::path_string(path));
        }
        exceptions.push(walker::path_string(&self.baseline));

        let mode = match self.mode {
            ModeArg::Index => Mode::Index,
            ModeArg::Update => Mode::Update,
            ModeArg::Analyze => Mode::Analyze,
        };

        let baseline = match mode {
            Mode::Index => {
                reporter.info("Opening baseline in writable mode");
                Baseline::create(&self.baseline)?
            }
            Mode::Update => {
                reporter.info("Opening baseline in writable mode");
                let baseline = Baseline::open(&self.baseline, true)?;
                reporter.info(format!("Read {} entries from baseline", baseline.len()));
                baseline
            }
            Mode::Analyze => {
                reporter.info("Opening baseline in read-only mode");
                let baseline = Baseline::open(&self.baseline, false)?;
                reporter.info(format!("Read {} entries from baseline", baseline.len()));
                baseline
            }
        };

        let mut engine = Engine::new(mode, baseline, exceptions, reporter);
        match walker::walk(&root, &mut engine) {
            Ok(()) => {
                let stats = engine.finalize();
                if self.json {
                    report::print_json_summary(&stats)?;
                } else {
                    report::print_summary(&stats, output_mode);
                }
                Ok(())
            }
            Err(e) => {
                // Still close the store for cleanliness; the error wins.
                engine.abort();
                Err(e)
            }
        }
    }
}
