//! FM-index builder
//!
//! Builds a self-index from a byte sequence by:
//! 1. Sorting all suffixes (sentinel row included) using parallel sort
//! 2. Deriving the BWT and its wavelet matrix
//! 3. Sampling the suffix array and its inverse every `sample_step` positions
//!
//! Index construction is an offline step; the query engine only ever reads
//! what this module writes.

use super::bitvec::{FinishedBits, RankBitsBuilder};
use super::types::*;
use super::wavelet::BuiltWavelet;
use crate::error::{Error, Result};
use rayon::prelude::*;
use std::io::{self, Write};

/// Builder for FM-indexes
pub struct FmIndexBuilder {
    config: IndexConfig,
}

impl FmIndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Create a builder with default configuration
    pub fn with_defaults() -> Self {
        Self::new(IndexConfig::default())
    }

    /// Build the index for `text`. The sentinel is appended internally, so
    /// `text` itself must not contain [`SENTINEL_BYTE`].
    pub fn build(&self, text: &[u8]) -> Result<BuiltFmIndex> {
        if let Some(position) = memchr::memchr(SENTINEL_BYTE, text) {
            return Err(Error::SentinelInText {
                position: position as u64,
            });
        }

        let sample_step = self.config.sample_step.max(1);
        let suffix_array = build_suffix_array_parallel(text);
        let size = suffix_array.len() as u64;

        let bwt: Vec<u8> = suffix_array
            .par_iter()
            .map(|&pos| {
                if pos == 0 {
                    SENTINEL_BYTE
                } else {
                    text[pos as usize - 1]
                }
            })
            .collect();

        let c_table = build_c_table(&bwt);
        let wavelet = BuiltWavelet::build(&bwt);

        let mut sa_marks = RankBitsBuilder::with_capacity(suffix_array.len());
        let mut sa_samples = Vec::with_capacity(suffix_array.len() / sample_step as usize + 1);
        let mut isa_samples = vec![0u64; size.div_ceil(sample_step) as usize];

        for (rank, &pos) in suffix_array.iter().enumerate() {
            let sampled = pos % sample_step == 0;
            sa_marks.push(sampled);
            if sampled {
                sa_samples.push(pos);
                isa_samples[(pos / sample_step) as usize] = rank as u64;
            }
        }

        Ok(BuiltFmIndex {
            size,
            sample_step,
            c_table,
            wavelet,
            sa_marks: sa_marks.finish(),
            sa_samples,
            isa_samples,
        })
    }
}

/// Result of building an FM-index, ready to be written
pub struct BuiltFmIndex {
    /// Number of suffixes (text length + sentinel)
    pub size: u64,
    pub sample_step: u64,
    /// C[c] = number of BWT symbols smaller than c
    pub c_table: [u64; ALPHABET],
    pub wavelet: BuiltWavelet,
    /// Marks ranks whose suffix position is a multiple of `sample_step`
    pub sa_marks: FinishedBits,
    /// Suffix positions of marked ranks, in rank order
    pub sa_samples: Vec<u64>,
    /// isa_samples[k] = rank of the suffix starting at k * sample_step
    pub isa_samples: Vec<u64>,
}

impl BuiltFmIndex {
    /// Serialize in the on-disk format read by [`FmIndex`](super::FmIndex)
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&FmIndexHeader::new(self.size, self.sample_step).to_bytes())?;
        for c in &self.c_table {
            out.write_all(&c.to_le_bytes())?;
        }
        self.wavelet.write_to(out)?;
        self.sa_marks.write_to(out)?;
        write_counted(out, &self.sa_samples)?;
        write_counted(out, &self.isa_samples)?;
        Ok(())
    }

    /// Serialize into a fresh buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut bytes);
        bytes
    }
}

fn write_counted<W: Write>(out: &mut W, values: &[u64]) -> io::Result<()> {
    out.write_all(&(values.len() as u64).to_le_bytes())?;
    for v in values {
        out.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

/// Build suffix array using parallel sort
///
/// Position `text.len()` is the sentinel suffix. Because the text holds no
/// sentinel byte, plain slice ordering (a proper prefix sorts first) is the
/// same as ordering with a trailing smallest sentinel.
///
/// Time: O(n log n) comparisons, each up to the longest repeat in the text.
/// Space: O(n) for the suffix array
pub(crate) fn build_suffix_array_parallel(text: &[u8]) -> Vec<u64> {
    let n = text.len();
    let mut sa: Vec<u64> = (0..=n as u64).collect();

    if n > 100_000 {
        sa.par_sort_unstable_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
    } else {
        sa.sort_unstable_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
    }

    sa
}

/// Build C-Table: C[c] = count of symbols lexicographically smaller than c
fn build_c_table(bwt: &[u8]) -> [u64; ALPHABET] {
    let mut counts = [0u64; ALPHABET];
    for &c in bwt {
        counts[c as usize] += 1;
    }

    let mut c_table = [0u64; ALPHABET];
    let mut sum = 0;
    for (slot, count) in c_table.iter_mut().zip(counts) {
        *slot = sum;
        sum += count;
    }
    c_table
}
