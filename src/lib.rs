//! Intact library crate
//!
//! Detects new, modified, and deleted files in a directory tree by comparing
//! content digests against a recorded baseline. Provides both a CLI binary
//! and a library API for programmatic use.

pub mod baseline;
pub mod cli;
pub mod engine;
pub mod exceptions;
pub mod hasher;
pub mod report;
pub mod walker;
