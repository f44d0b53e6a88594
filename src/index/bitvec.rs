//! Succinct rank bit vector
//!
//! **Interleaved Memory Layout**: [RankHeader(u64) | Body(8 x u64)] per
//! 512-bit block, so a rank query touches one header and at most eight
//! neighbouring words. A trailing header block always exists, which makes
//! `rank1(len)` valid without special cases.

use super::storage::{SectionReader, WordSlice};
use std::io::{self, Write};

const BLOCK_BITS: usize = 512;
const WORDS_PER_BLOCK: usize = 8;
const BLOCK_STRIDE: usize = WORDS_PER_BLOCK + 1; // 1 Header + 8 Body

/// Number of words needed to store `len` bits in the interleaved layout
#[inline]
fn words_for(len: usize) -> usize {
    (len / BLOCK_BITS + 1) * BLOCK_STRIDE
}

/// Append-only builder for [`RankBits`]
#[derive(Clone, Default)]
pub struct RankBitsBuilder {
    data: Vec<u64>,
    len: usize,
}

impl RankBitsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity(words_for(bits)),
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let block = self.len / BLOCK_BITS;
        let offset = self.len % BLOCK_BITS;
        let base = block * BLOCK_STRIDE;

        if self.data.len() < base + BLOCK_STRIDE {
            self.data.resize(base + BLOCK_STRIDE, 0);
        }
        if bit {
            self.data[base + 1 + offset / 64] |= 1u64 << (offset % 64);
        }
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Write the rank headers and return the finished word layout
    pub fn finish(mut self) -> FinishedBits {
        let num_blocks = self.len / BLOCK_BITS + 1;
        self.data.resize(num_blocks * BLOCK_STRIDE, 0);

        let mut sum = 0u64;
        for b in 0..num_blocks {
            let base = b * BLOCK_STRIDE;
            self.data[base] = sum;
            for w in 0..WORDS_PER_BLOCK {
                sum += self.data[base + 1 + w].count_ones() as u64;
            }
        }

        FinishedBits {
            words: self.data,
            len: self.len,
            ones: sum,
        }
    }
}

/// Finalized bit vector words, ready to be serialized
pub struct FinishedBits {
    pub words: Vec<u64>,
    pub len: usize,
    pub ones: u64,
}

impl FinishedBits {
    /// Serialized size in bytes
    pub fn byte_len(&self) -> usize {
        16 + self.words.len() * 8
    }

    /// Write as `bit_len, word_count, words`
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&(self.len as u64).to_le_bytes())?;
        out.write_all(&(self.words.len() as u64).to_le_bytes())?;
        for word in &self.words {
            out.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }
}

/// Read-only rank bit vector over a resident or mapped word slice
#[derive(Clone)]
pub struct RankBits {
    words: WordSlice,
    len: usize,
}

impl RankBits {
    /// Parse a serialized bit vector from the current reader position
    pub fn read(reader: &mut SectionReader<'_>) -> Result<Self, String> {
        let len = reader.read_usize()?;
        let words = reader.read_counted_words()?;
        let expected = (len / BLOCK_BITS + 1)
            .checked_mul(BLOCK_STRIDE)
            .ok_or_else(|| format!("bit vector of {} bits is too long", len))?;
        if words.len() != expected {
            return Err(format!(
                "bit vector of {} bits has {} words, expected {}",
                len,
                words.len(),
                expected
            ));
        }
        if words.get(words.len() - BLOCK_STRIDE) > len as u64 {
            return Err("bit vector rank header exceeds its length".into());
        }
        Ok(Self { words, len })
    }

    /// Access bit at index
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        let block = i / BLOCK_BITS;
        let offset = i % BLOCK_BITS;
        let word = self.words.get(block * BLOCK_STRIDE + 1 + offset / 64);
        (word >> (offset % 64)) & 1 != 0
    }

    /// Rank1(i): Count 1s in [0..i), valid for i <= len
    #[inline]
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.len);
        let block = i / BLOCK_BITS;
        let offset = i % BLOCK_BITS;
        let base = block * BLOCK_STRIDE;

        let mut r = self.words.get(base) as usize;
        let word_idx = offset / 64;
        for w in 0..word_idx {
            r += self.words.get(base + 1 + w).count_ones() as usize;
        }
        let bit_idx = offset % 64;
        if bit_idx > 0 {
            let mask = (1u64 << bit_idx) - 1;
            r += (self.words.get(base + 1 + word_idx) & mask).count_ones() as usize;
        }
        r
    }

    /// Rank0(i): Count 0s in [0..i)
    #[inline]
    pub fn rank0(&self, i: usize) -> usize {
        i.min(self.len) - self.rank1(i)
    }

    /// Rank(bit, i): Generalized rank query
    #[inline]
    pub fn rank(&self, bit: bool, i: usize) -> usize {
        if bit { self.rank1(i) } else { self.rank0(i) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
pub(crate) fn load_for_test(bits: FinishedBits) -> RankBits {
    use super::storage::Backing;

    let mut bytes = Vec::with_capacity(bits.byte_len());
    bits.write_to(&mut bytes).unwrap();
    let backing = Backing::from_vec(bytes);
    let mut reader = SectionReader::new(&backing, 0);
    RankBits::read(&mut reader).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(bits: &[bool]) -> RankBits {
        let mut builder = RankBitsBuilder::new();
        for &b in bits {
            builder.push(b);
        }
        load_for_test(builder.finish())
    }

    #[test]
    fn test_rank1_simple() {
        // 1 0 1 1 0 1
        let bv = build(&[true, false, true, true, false, true]);

        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(2), 1);
        assert_eq!(bv.rank1(4), 3);
        assert_eq!(bv.rank1(6), 4);
        assert_eq!(bv.rank0(6), 2);
        assert!(bv.get(0));
        assert!(!bv.get(4));
    }

    #[test]
    fn test_rank_across_blocks() {
        let bits: Vec<bool> = (0..2000).map(|i| i % 3 == 0).collect();
        let bv = build(&bits);

        let mut expected = 0;
        for i in 0..=bits.len() {
            assert_eq!(bv.rank1(i), expected, "rank1 mismatch at {}", i);
            if i < bits.len() && bits[i] {
                expected += 1;
            }
        }
    }

    #[test]
    fn test_exact_block_boundary() {
        let bv = build(&vec![true; 1024]);
        assert_eq!(bv.rank1(512), 512);
        assert_eq!(bv.rank1(1024), 1024);
        assert_eq!(bv.rank0(1024), 0);
    }

    #[test]
    fn test_empty() {
        let bv = build(&[]);
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(0), 0);
    }

    #[test]
    fn test_word_count_validated() {
        let mut builder = RankBitsBuilder::new();
        builder.push(true);
        let finished = builder.finish();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&600u64.to_le_bytes()); // claims 600 bits
        bytes.extend_from_slice(&(finished.words.len() as u64).to_le_bytes());
        for w in &finished.words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        let backing = super::super::storage::Backing::from_vec(bytes);
        let mut reader = SectionReader::new(&backing, 0);
        assert!(RankBits::read(&mut reader).is_err());
    }
}
