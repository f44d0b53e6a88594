//! Types for FM-index storage
//!
//! This module defines the constants and headers shared by the builder,
//! the writer and the memory-mapped reader.

use serde::{Deserialize, Serialize};

/// Position in the indexed text (supports up to 16 exabytes)
pub type TextPosition = u64;

/// Row of the conceptual suffix array
pub type Rank = u64;

/// Magic number for FM-index files
pub const FM_MAGIC: [u8; 4] = *b"FMI1";

/// Current version of the FM-index format
pub const FM_VERSION: u32 = 1;

/// End-of-text marker appended by the index.
/// Lexicographically smallest symbol; must not occur in indexed text.
pub const SENTINEL_BYTE: u8 = 0x00;

/// Separator written before every document in a shard's text
pub const SEPARATOR_BYTE: u8 = 0xFF;

/// Number of wavelet matrix layers (one per bit of a byte)
pub const LAYERS: usize = 8;

/// Size of the byte alphabet
pub const ALPHABET: usize = 256;

/// Configuration for FM-index building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Distance between sampled suffix array / inverse suffix array entries.
    /// Lower is faster to invert and extract, higher is smaller on disk.
    pub sample_step: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { sample_step: 32 }
    }
}

/// Fixed-size header at the start of an FM-index file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmIndexHeader {
    /// Magic number (FM_MAGIC)
    pub magic: [u8; 4],
    /// Version number
    pub version: u32,
    /// Number of suffixes, including the sentinel row
    pub size: u64,
    /// SA/ISA sampling distance
    pub sample_step: u64,
}

impl FmIndexHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 8 + 8; // 24 bytes

    pub fn new(size: u64, sample_step: u64) -> Self {
        Self {
            magic: FM_MAGIC,
            version: FM_VERSION,
            size,
            sample_step,
        }
    }

    /// Serialize into the first `SIZE` bytes of a file
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.magic);
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..16].copy_from_slice(&self.size.to_le_bytes());
        out[16..24].copy_from_slice(&self.sample_step.to_le_bytes());
        out
    }

    /// Parse a header, returning a human-readable reason on failure
    pub fn parse(data: &[u8]) -> Result<Self, String> {
        if data.len() < Self::SIZE {
            return Err("file too small".into());
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        if magic != FM_MAGIC {
            return Err("bad magic number".into());
        }
        let version = read_u32(data, 4);
        if version != FM_VERSION {
            return Err(format!("unsupported version {}", version));
        }
        let size = read_u64(data, 8);
        let sample_step = read_u64(data, 16);
        if sample_step == 0 {
            return Err("sample step is zero".into());
        }
        Ok(Self {
            magic,
            version,
            size,
            sample_step,
        })
    }
}

#[inline]
pub(crate) fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(buf)
}
