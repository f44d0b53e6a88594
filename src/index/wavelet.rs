//! Wavelet Matrix over a byte sequence
//!
//! Stores the BWT and answers `get(i)` and `rank(c, i)` in 8 rank queries
//! each, independent of alphabet size. Built with ping-pong buffers, read
//! back from a resident or mapped backing.

use super::bitvec::{FinishedBits, RankBits, RankBitsBuilder};
use super::storage::SectionReader;
use super::types::LAYERS;
use std::io::{self, Write};

/// Wavelet matrix layers ready to be serialized
pub struct BuiltWavelet {
    pub layers: Vec<FinishedBits>,
    pub zeros: [u64; LAYERS],
    pub len: usize,
}

impl BuiltWavelet {
    /// Build with double buffering: only 2 auxiliary buffers of size N,
    /// reused across all 8 layers via `mem::swap`.
    pub fn build(text: &[u8]) -> Self {
        let n = text.len();
        let mut builders: Vec<RankBitsBuilder> =
            (0..LAYERS).map(|_| RankBitsBuilder::with_capacity(n)).collect();
        let mut zeros = [0u64; LAYERS];

        let mut current = text.to_vec();
        let mut next = vec![0u8; n];

        // MSB to LSB
        for d in (0..LAYERS).rev() {
            let bit_mask = 1u8 << d;
            let zero_count = current.iter().filter(|&&c| c & bit_mask == 0).count();
            zeros[d] = zero_count as u64;

            let mut z_ptr = 0;
            let mut o_ptr = zero_count;
            for &c in current.iter() {
                let bit = c & bit_mask != 0;
                builders[d].push(bit);
                if bit {
                    next[o_ptr] = c;
                    o_ptr += 1;
                } else {
                    next[z_ptr] = c;
                    z_ptr += 1;
                }
            }
            std::mem::swap(&mut current, &mut next);
        }

        Self {
            layers: builders.into_iter().map(RankBitsBuilder::finish).collect(),
            zeros,
            len: n,
        }
    }

    /// Write as `zeros[8]` followed by the 8 layers (layer 0 first)
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for z in &self.zeros {
            out.write_all(&z.to_le_bytes())?;
        }
        for layer in &self.layers {
            layer.write_to(out)?;
        }
        Ok(())
    }
}

/// Read-only wavelet matrix
pub struct WaveletMatrix {
    layers: Vec<RankBits>,
    zeros: [usize; LAYERS],
    len: usize,
}

impl WaveletMatrix {
    pub fn read(reader: &mut SectionReader<'_>) -> Result<Self, String> {
        let mut zeros = [0usize; LAYERS];
        for z in zeros.iter_mut() {
            *z = reader.read_usize()?;
        }
        let mut layers = Vec::with_capacity(LAYERS);
        for _ in 0..LAYERS {
            layers.push(RankBits::read(reader)?);
        }
        let len = layers[0].len();
        if layers.iter().any(|l| l.len() != len) {
            return Err("wavelet layers have different lengths".into());
        }
        for (d, layer) in layers.iter().enumerate() {
            if zeros[d].checked_add(layer.rank1(len)) != Some(len) {
                return Err(format!("wavelet layer {} zero count does not match its bits", d));
            }
        }
        Ok(Self { layers, zeros, len })
    }

    /// Get symbol at position i
    #[inline]
    pub fn get(&self, mut i: usize) -> u8 {
        let mut c = 0u8;
        for d in (0..LAYERS).rev() {
            let layer = &self.layers[d];
            let bit = layer.get(i);
            c |= (bit as u8) << d;
            i = if bit {
                self.zeros[d] + layer.rank1(i)
            } else {
                layer.rank0(i)
            };
        }
        c
    }

    /// Rank(c, i): Count occurrences of symbol c in [0..i)
    #[inline]
    pub fn rank(&self, c: u8, mut i: usize) -> usize {
        let mut start = 0;
        for d in (0..LAYERS).rev() {
            let layer = &self.layers[d];
            let bit = (c >> d) & 1 != 0;
            let rank_start = layer.rank(bit, start);
            let rank_end = layer.rank(bit, i);
            if bit {
                start = self.zeros[d] + rank_start;
                i = self.zeros[d] + rank_end;
            } else {
                start = rank_start;
                i = rank_end;
            }
        }
        i - start
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
mod tests {
    use super::*;
    use crate::index::storage::Backing;

    fn load(text: &[u8]) -> WaveletMatrix {
        let built = BuiltWavelet::build(text);
        let mut bytes = Vec::new();
        built.write_to(&mut bytes).unwrap();
        let backing = Backing::from_vec(bytes);
        let mut reader = SectionReader::new(&backing, 0);
        WaveletMatrix::read(&mut reader).unwrap()
    }

    #[test]
    fn test_wavelet_get() {
        let text = b"abracadabra";
        let wm = load(text);
        for (i, &c) in text.iter().enumerate() {
            assert_eq!(wm.get(i), c, "Mismatch at position {}", i);
        }
    }

    #[test]
    fn test_wavelet_rank() {
        let wm = load(b"abracadabra");

        // 'a' at 0, 3, 5, 7, 10
        assert_eq!(wm.rank(b'a', 0), 0);
        assert_eq!(wm.rank(b'a', 1), 1);
        assert_eq!(wm.rank(b'a', 4), 2);
        assert_eq!(wm.rank(b'a', 11), 5);

        // 'b' at 1, 8
        assert_eq!(wm.rank(b'b', 2), 1);
        assert_eq!(wm.rank(b'b', 11), 2);
        assert_eq!(wm.rank(b'z', 11), 0);
    }

    #[test]
    fn test_wavelet_full_alphabet() {
        let text: Vec<u8> = (0u16..256).map(|x| x as u8).collect();
        let wm = load(&text);
        for i in 0..256 {
            assert_eq!(wm.get(i), i as u8);
        }
        for c in 0..=255u8 {
            assert_eq!(wm.rank(c, 256), 1);
        }
    }

    #[test]
    fn test_wavelet_empty() {
        let wm = load(b"");
        assert!(wm.is_empty());
    }
}
