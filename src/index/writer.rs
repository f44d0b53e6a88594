//! FM-index writer
//!
//! Writes built indexes and offset tables to disk in the flat little-endian
//! layout the reader maps directly.

use super::builder::BuiltFmIndex;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes FM-index files
pub struct FmIndexWriter;

impl FmIndexWriter {
    /// Write a built index to `path`
    pub fn write(path: &Path, built: &BuiltFmIndex) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut file = BufWriter::with_capacity(65536, file);
        built.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Write an offset table as consecutive u64 little-endian entries
    pub fn write_offsets(path: &Path, offsets: &[u64]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut file = BufWriter::with_capacity(65536, file);

        // Using a buffer to reduce system call overhead
        let mut buffer = Vec::with_capacity(8 * 1024);
        for &entry in offsets {
            buffer.extend_from_slice(&entry.to_le_bytes());
            if buffer.len() >= 8 * 1024 {
                file.write_all(&buffer)?;
                buffer.clear();
            }
        }
        if !buffer.is_empty() {
            file.write_all(&buffer)?;
        }

        file.flush()?;
        Ok(())
    }
}
