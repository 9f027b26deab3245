//! Streaming SHA-1 content digests

use anyhow::{Context, Result};
use memmap2::MmapOptions;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const MEMMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB
const BUFFER_SIZE: usize = 8 * 1024 * 1024; // 8MB

/// Computes lowercase hex digests of file contents.
///
/// One instance is reused across a whole traversal; the digest state is
/// reset after every file via `finalize_reset`.
pub struct FileHasher {
    sha: Sha1,
    buf: Vec<u8>,
}

impl FileHasher {
    pub fn new() -> Self {
        Self {
            sha: Sha1::new(),
            buf: vec![0u8; BUFFER_SIZE],
        }
    }

    /// Digest a file's byte stream, returning the hex digest and the number
    /// of bytes hashed.
    ///
    /// Uses memory mapping for large files, buffered reads otherwise. Any
    /// I/O failure here is fatal to the run; a baseline with gaps is worse
    /// than no baseline.
    pub fn digest_file(&mut self, path: &Path) -> Result<(String, u64)> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        let metadata = file
            .metadata()
            .with_context(|| format!("Failed to get metadata: {}", path.display()))?;
        let size = metadata.len();

        if size >= MEMMAP_THRESHOLD {
            // Safety: We're only reading the file, not modifying it
            let mmap = unsafe {
                MmapOptions::new()
                    .map(&file)
                    .with_context(|| format!("Failed to memory map file: {}", path.display()))?
            };
            self.sha.update(&mmap[..]);
        } else {
            let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
            loop {
                let bytes_read = reader
                    .read(&mut self.buf)
                    .with_context(|| format!("Failed to read file: {}", path.display()))?;
                if bytes_read == 0 {
                    break;
                }
                self.sha.update(&self.buf[..bytes_read]);
            }
        }

        let digest = self.sha.finalize_reset();
        Ok((format!("{:x}", digest), size))
    }
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new()
    }
}
