//! FM-index reader
//!
//! Provides resident or memory-mapped access to an FM-index with:
//! - backward search in O(m) rank queries for a pattern of length m
//! - suffix array inversion by LF-walking to the nearest SA sample
//! - range extraction by LF-walking back from the nearest ISA sample
//!
//! The query engine only talks to indexes through [`SelfIndex`], so any
//! conforming compressed self-index can stand in for [`FmIndex`].

use super::bitvec::RankBits;
use super::builder::BuiltFmIndex;
use super::storage::{Backing, SectionReader, WordSlice};
use super::types::*;
use super::wavelet::WaveletMatrix;
use crate::config::LoadMode;
use crate::error::{Error, Result};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Capability interface of a compressed full-text self-index
///
/// The indexed sequence is the text followed by one end-of-text sentinel,
/// so `size()` is the text length plus one and rank `0` is the sentinel
/// suffix.
pub trait SelfIndex: Send + Sync {
    /// Number of suffixes (text length + 1)
    fn size(&self) -> u64;

    /// Half-open rank interval of suffixes prefixed by `pattern`.
    /// An empty match has `start == end`; only its width is meaningful.
    fn backward_search(&self, pattern: &[u8]) -> Range<Rank>;

    /// Text position of the suffix at `rank` (SA[rank]), `rank < size()`
    fn invert(&self, rank: Rank) -> TextPosition;

    /// Text bytes in `[start, end)`, clipped to the text (sentinel excluded)
    fn extract(&self, start: TextPosition, end: TextPosition) -> Vec<u8>;
}

/// FM-index over a resident or memory-mapped file
pub struct FmIndex {
    backing: Arc<Backing>,
    size: u64,
    sample_step: u64,
    c_table: [u64; ALPHABET],
    wm: WaveletMatrix,
    sa_marks: RankBits,
    sa_samples: WordSlice,
    isa_samples: WordSlice,
}

impl FmIndex {
    /// Open an index file, reading it fully or mapping it
    pub fn open(path: &Path, mode: LoadMode) -> Result<Self> {
        let backing = Backing::open(path, mode)?;
        Self::from_backing(backing).map_err(|reason| Error::corrupt(path, reason))
    }

    /// Load an index that was just built, without touching disk
    pub fn from_built(built: &BuiltFmIndex) -> Result<Self> {
        Self::from_backing(Backing::from_vec(built.to_bytes()))
            .map_err(|reason| Error::corrupt("<memory>", reason))
    }

    /// Parse and validate the section layout of a backing
    pub fn from_backing(backing: Arc<Backing>) -> std::result::Result<Self, String> {
        let header = FmIndexHeader::parse(&backing)?;
        let mut reader = SectionReader::new(&backing, FmIndexHeader::SIZE);

        let mut c_table = [0u64; ALPHABET];
        for c in c_table.iter_mut() {
            *c = reader.read_u64()?;
        }
        if c_table.windows(2).any(|w| w[0] > w[1]) || c_table[ALPHABET - 1] > header.size {
            return Err("C table is not monotonic".into());
        }

        let wm = WaveletMatrix::read(&mut reader)?;
        let sa_marks = RankBits::read(&mut reader)?;
        let sa_samples = reader.read_counted_words()?;
        let isa_samples = reader.read_counted_words()?;

        if header.size == 0 {
            return Err("index has no sentinel row".into());
        }
        if wm.len() as u64 != header.size || sa_marks.len() as u64 != header.size {
            return Err(format!(
                "section lengths ({}, {}) disagree with header size {}",
                wm.len(),
                sa_marks.len(),
                header.size
            ));
        }
        if sa_marks.rank1(sa_marks.len()) != sa_samples.len() {
            return Err("SA sample count disagrees with sample marks".into());
        }
        if isa_samples.len() as u64 != header.size.div_ceil(header.sample_step) {
            return Err("ISA sample count disagrees with sample step".into());
        }
        if reader.remaining() != 0 {
            return Err(format!("{} trailing bytes", reader.remaining()));
        }

        Ok(Self {
            backing,
            size: header.size,
            sample_step: header.sample_step,
            c_table,
            wm,
            sa_marks,
            sa_samples,
            isa_samples,
        })
    }

    /// Length of the indexed text, sentinel excluded
    #[inline]
    pub fn text_len(&self) -> u64 {
        self.size - 1
    }

    pub fn is_mapped(&self) -> bool {
        self.backing.is_mapped()
    }

    /// LF-mapping: rank of the suffix one position to the left.
    /// Returns the preceding symbol along with the new rank.
    #[inline]
    fn lf(&self, rank: u64) -> (u8, u64) {
        let c = self.wm.get(rank as usize);
        let next = self.c_table[c as usize] + self.wm.rank(c, rank as usize) as u64;
        (c, next)
    }

    /// Count occurrences of a pattern
    pub fn count(&self, pattern: &[u8]) -> u64 {
        let range = self.backward_search(pattern);
        range.end - range.start
    }
}

impl SelfIndex for FmIndex {
    fn size(&self) -> u64 {
        self.size
    }

    fn backward_search(&self, pattern: &[u8]) -> Range<Rank> {
        let mut sp = 0u64;
        let mut ep = self.size;

        // Process pattern from last byte to first
        for &c in pattern.iter().rev() {
            if c == SENTINEL_BYTE {
                return 0..0;
            }
            let base = self.c_table[c as usize];
            sp = base + self.wm.rank(c, sp as usize) as u64;
            ep = base + self.wm.rank(c, ep as usize) as u64;
            if sp >= ep {
                return sp..sp;
            }
        }
        sp..ep
    }

    fn invert(&self, rank: Rank) -> TextPosition {
        assert!(
            rank < self.size,
            "rank {} out of range for index of size {}",
            rank,
            self.size
        );
        let mut i = rank;
        let mut steps = 0u64;
        loop {
            if self.sa_marks.get(i as usize) {
                let idx = self.sa_marks.rank1(i as usize);
                return self.sa_samples.get(idx) + steps;
            }
            let (c, next) = self.lf(i);
            if c == SENTINEL_BYTE {
                // Suffix starts at text position 0
                return steps;
            }
            i = next;
            steps += 1;
        }
    }

    fn extract(&self, start: TextPosition, end: TextPosition) -> Vec<u8> {
        let end = end.min(self.text_len());
        if start >= end {
            return Vec::new();
        }

        // Start from the nearest sampled position at or after `end`. Past the
        // last sample, the sentinel suffix (always rank 0) is used instead.
        let k = end.div_ceil(self.sample_step);
        let (mut pos, mut rank) = if k * self.sample_step < self.size {
            (k * self.sample_step, self.isa_samples.get(k as usize))
        } else {
            (self.text_len(), 0)
        };

        let mut out = Vec::with_capacity((end - start) as usize);
        while pos > start {
            let (c, next) = self.lf(rank);
            pos -= 1;
            if pos < end {
                out.push(c);
            }
            rank = next;
        }
        out.reverse();
        out
    }
}
