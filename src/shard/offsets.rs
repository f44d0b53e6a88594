//! Document offset tables
//!
//! An offset file holds one little-endian u64 per document: the position in
//! the shard's text where that document's record begins. The table is
//! logically one entry longer than the file: entry `doc_count` is the
//! terminator, the length of the indexed text (index size minus the
//! sentinel).

use crate::config::LoadMode;
use crate::error::{Error, Result};
use crate::index::storage::{Backing, WordSlice};
use std::path::Path;

/// Sorted document start positions of one shard
pub struct OffsetTable {
    entries: WordSlice,
    terminator: u64,
}

impl OffsetTable {
    /// Open an offset file. `terminator` closes the last document.
    pub fn open(path: &Path, mode: LoadMode, terminator: u64) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        if std::fs::metadata(path)?.len() == 0 {
            return Err(Error::EmptyOffsets(path.to_path_buf()));
        }
        let backing = Backing::open(path, mode)?;
        Self::from_backing(backing, terminator).map_err(|reason| Error::corrupt(path, reason))
    }

    /// Build a table from in-memory offsets
    pub fn from_vec(offsets: Vec<u64>, terminator: u64) -> Result<Self> {
        if offsets.is_empty() {
            return Err(Error::EmptyOffsets("<memory>".into()));
        }
        let bytes = offsets.iter().flat_map(|o| o.to_le_bytes()).collect();
        Self::from_backing(Backing::from_vec(bytes), terminator)
            .map_err(|reason| Error::corrupt("<memory>", reason))
    }

    fn from_backing(
        backing: std::sync::Arc<Backing>,
        terminator: u64,
    ) -> std::result::Result<Self, String> {
        let entries = WordSlice::whole(backing)?;
        if entries.is_empty() {
            return Err("offset table is empty".into());
        }
        // Endpoint checks only: a full monotonicity scan would fault in
        // every page of a mapped table at open time.
        if entries.get(0) != 0 {
            return Err(format!("first offset is {}, expected 0", entries.get(0)));
        }
        let last = entries.get(entries.len() - 1);
        if last > terminator {
            return Err(format!(
                "last offset {} lies past the end of the text ({})",
                last, terminator
            ));
        }
        Ok(Self {
            entries,
            terminator,
        })
    }

    /// Number of documents
    #[inline]
    pub fn doc_count(&self) -> usize {
        self.entries.len()
    }

    /// Offset of document `d`; `d == doc_count` yields the terminator
    #[inline]
    pub fn get(&self, d: usize) -> u64 {
        assert!(d <= self.doc_count(), "document {} out of range", d);
        if d == self.doc_count() {
            self.terminator
        } else {
            self.entries.get(d)
        }
    }

    /// Greatest document `d` with `get(d) <= pos`, by binary search
    pub fn find_owner(&self, pos: u64) -> usize {
        let mut lo = 0;
        let mut hi = self.doc_count();
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.get(mid) <= pos {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::writer::FmIndexWriter;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_get_and_terminator() {
        let table = OffsetTable::from_vec(vec![0, 12, 24], 34).unwrap();
        assert_eq!(table.doc_count(), 3);
        assert_eq!(table.get(1), 12);
        assert_eq!(table.get(3), 34);
    }

    #[test]
    fn test_find_owner() {
        let table = OffsetTable::from_vec(vec![0, 12, 24], 34).unwrap();
        assert_eq!(table.find_owner(0), 0);
        assert_eq!(table.find_owner(11), 0);
        assert_eq!(table.find_owner(12), 1);
        assert_eq!(table.find_owner(23), 1);
        assert_eq!(table.find_owner(24), 2);
        assert_eq!(table.find_owner(34), 2);
    }

    #[test]
    fn test_single_document() {
        let table = OffsetTable::from_vec(vec![0], 5).unwrap();
        assert_eq!(table.find_owner(3), 0);
        assert_eq!(table.get(1), 5);
    }

    #[test]
    fn test_open_validation() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing");
        assert!(matches!(
            OffsetTable::open(&missing, LoadMode::Mapped, 10),
            Err(Error::MissingFile(_))
        ));

        let empty = dir.path().join("empty");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            OffsetTable::open(&empty, LoadMode::Mapped, 10),
            Err(Error::EmptyOffsets(_))
        ));

        let ragged = dir.path().join("ragged");
        fs::write(&ragged, [0u8; 5]).unwrap();
        assert!(matches!(
            OffsetTable::open(&ragged, LoadMode::Resident, 10),
            Err(Error::Corrupt { .. })
        ));

        let past_end = dir.path().join("past_end");
        FmIndexWriter::write_offsets(&past_end, &[0, 50]).unwrap();
        assert!(matches!(
            OffsetTable::open(&past_end, LoadMode::Resident, 10),
            Err(Error::Corrupt { .. })
        ));
    }

    #[test]
    fn test_open_both_modes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_offset");
        FmIndexWriter::write_offsets(&path, &[0, 4, 9]).unwrap();

        for mode in [LoadMode::Resident, LoadMode::Mapped] {
            let table = OffsetTable::open(&path, mode, 15).unwrap();
            assert_eq!(table.doc_count(), 3);
            assert_eq!(table.find_owner(10), 2);
        }
    }
}
