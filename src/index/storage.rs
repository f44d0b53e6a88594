//! Owned or memory-mapped file contents
//!
//! Every structure loaded from a shard directory reads its bytes through a
//! [`Backing`]. The backing owns the memory: dropping the last handle frees
//! the buffer or unmaps the file, so no load path can leak a mapping.

use super::types::read_u64;
use crate::config::LoadMode;
use crate::error::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// Bytes of one loaded file
pub enum Backing {
    /// File read fully into memory
    Owned(Vec<u8>),
    /// File memory-mapped read-only
    Mapped(Mmap),
}

impl Backing {
    /// Load a file according to the load mode
    pub fn open(path: &Path, mode: LoadMode) -> Result<Arc<Self>> {
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let backing = match mode {
            LoadMode::Resident => Backing::Owned(std::fs::read(path)?),
            LoadMode::Mapped => {
                let file = File::open(path)?;
                // Shard files are immutable once built
                let mmap = unsafe { Mmap::map(&file)? };
                Backing::Mapped(mmap)
            }
        };
        Ok(Arc::new(backing))
    }

    /// Wrap an in-memory buffer
    pub fn from_vec(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Backing::Owned(bytes))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, Backing::Mapped(_))
    }
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Owned(bytes) => bytes,
            Backing::Mapped(mmap) => mmap,
        }
    }
}

/// A run of little-endian u64 words inside a backing
#[derive(Clone)]
pub struct WordSlice {
    backing: Arc<Backing>,
    offset: usize,
    len: usize,
}

impl WordSlice {
    /// Get word at index i
    #[inline]
    pub fn get(&self, i: usize) -> u64 {
        debug_assert!(i < self.len);
        read_u64(&self.backing, self.offset + i * 8)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View a whole backing as words (used for offset tables)
    pub fn whole(backing: Arc<Backing>) -> std::result::Result<Self, String> {
        if backing.len() % 8 != 0 {
            return Err(format!("length {} is not a multiple of 8", backing.len()));
        }
        let len = backing.len() / 8;
        Ok(Self {
            backing,
            offset: 0,
            len,
        })
    }
}

/// Sequential reader over the sections of a backing
pub struct SectionReader<'a> {
    backing: &'a Arc<Backing>,
    pos: usize,
}

impl<'a> SectionReader<'a> {
    pub fn new(backing: &'a Arc<Backing>, start: usize) -> Self {
        Self {
            backing,
            pos: start,
        }
    }

    pub fn read_u64(&mut self) -> std::result::Result<u64, String> {
        if self.pos + 8 > self.backing.len() {
            return Err(format!("truncated at byte {}", self.pos));
        }
        let value = read_u64(self.backing, self.pos);
        self.pos += 8;
        Ok(value)
    }

    pub fn read_usize(&mut self) -> std::result::Result<usize, String> {
        let value = self.read_u64()?;
        usize::try_from(value).map_err(|_| format!("value {} does not fit in usize", value))
    }

    /// Take the next `count` words as a slice, without copying
    pub fn read_words(&mut self, count: usize) -> std::result::Result<WordSlice, String> {
        let bytes = count
            .checked_mul(8)
            .ok_or_else(|| format!("section of {} words overflows", count))?;
        if self.remaining() < bytes {
            return Err(format!(
                "section of {} words at byte {} runs past end of file",
                count, self.pos
            ));
        }
        let slice = WordSlice {
            backing: Arc::clone(self.backing),
            offset: self.pos,
            len: count,
        };
        self.pos += bytes;
        Ok(slice)
    }

    /// Read a length-prefixed word section
    pub fn read_counted_words(&mut self) -> std::result::Result<WordSlice, String> {
        let count = self.read_usize()?;
        self.read_words(count)
    }

    pub fn remaining(&self) -> usize {
        self.backing.len().saturating_sub(self.pos)
    }
}
