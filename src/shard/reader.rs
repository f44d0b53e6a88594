//! Shard loading
//!
//! A shard is one independently loadable partition of the corpus: a text
//! self-index, its document offset table and, optionally, a parallel
//! self-index over per-document metadata records.

use super::offsets::OffsetTable;
use super::{DATA_INDEX_FILE, DATA_OFFSET_FILE, META_INDEX_FILE, META_OFFSET_FILE};
use crate::config::LoadMode;
use crate::error::{Error, Result};
use crate::index::{FmIndex, SelfIndex};
use std::path::Path;

/// Metadata self-index and its record offsets
pub struct MetaStore<I> {
    pub index: I,
    pub offsets: OffsetTable,
}

/// One loaded shard, immutable for its whole lifetime
pub struct Shard<I: SelfIndex = FmIndex> {
    text: I,
    doc_offsets: OffsetTable,
    meta: Option<MetaStore<I>>,
}

impl Shard<FmIndex> {
    /// Load a shard directory
    ///
    /// Fails if the directory or any required file is missing, or if an
    /// offset table is empty. Everything loaded before the failure is
    /// released when the error is returned.
    pub fn open(dir: &Path, mode: LoadMode, get_metadata: bool) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::ShardNotFound(dir.to_path_buf()));
        }

        let text = FmIndex::open(&dir.join(DATA_INDEX_FILE), mode)?;
        let doc_offsets =
            OffsetTable::open(&dir.join(DATA_OFFSET_FILE), mode, text.size() - 1)?;

        let meta = if get_metadata {
            let index = FmIndex::open(&dir.join(META_INDEX_FILE), mode)?;
            let offsets =
                OffsetTable::open(&dir.join(META_OFFSET_FILE), mode, index.size() - 1)?;
            if offsets.doc_count() != doc_offsets.doc_count() {
                return Err(Error::corrupt(
                    dir.join(META_OFFSET_FILE),
                    format!(
                        "{} metadata records for {} documents",
                        offsets.doc_count(),
                        doc_offsets.doc_count()
                    ),
                ));
            }
            Some(MetaStore { index, offsets })
        } else {
            None
        };

        tracing::debug!(
            dir = %dir.display(),
            doc_count = doc_offsets.doc_count(),
            text_len = text.text_len(),
            mapped = text.is_mapped(),
            "shard loaded"
        );

        Ok(Self {
            text,
            doc_offsets,
            meta,
        })
    }
}

impl<I: SelfIndex> Shard<I> {
    /// Assemble a shard from already-loaded parts
    pub fn from_parts(
        text: I,
        doc_offsets: Vec<u64>,
        meta: Option<(I, Vec<u64>)>,
    ) -> Result<Self> {
        let doc_offsets = OffsetTable::from_vec(doc_offsets, text.size() - 1)?;
        let meta = match meta {
            Some((index, offsets)) => {
                let offsets = OffsetTable::from_vec(offsets, index.size() - 1)?;
                if offsets.doc_count() != doc_offsets.doc_count() {
                    return Err(Error::corrupt(
                        "<memory>",
                        "metadata record count differs from document count",
                    ));
                }
                Some(MetaStore { index, offsets })
            }
            None => None,
        };
        Ok(Self {
            text,
            doc_offsets,
            meta,
        })
    }

    pub fn text_index(&self) -> &I {
        &self.text
    }

    pub fn doc_offsets(&self) -> &OffsetTable {
        &self.doc_offsets
    }

    pub fn meta(&self) -> Option<&MetaStore<I>> {
        self.meta.as_ref()
    }

    /// Number of suffix array rows (text length + sentinel)
    pub fn size(&self) -> u64 {
        self.text.size()
    }

    pub fn doc_count(&self) -> u64 {
        self.doc_offsets.doc_count() as u64
    }

    pub fn has_metadata(&self) -> bool {
        self.meta.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::writer::ShardWriter;
    use std::fs;
    use tempfile::tempdir;

    fn setup_shard(dir: &Path) {
        let mut writer = ShardWriter::with_defaults();
        writer.add_document(b"hello world", b"{\"id\":0}").unwrap();
        writer.add_document(b"world peace", b"{\"id\":1}").unwrap();
        writer.add_document(b"say hello", b"{\"id\":2}").unwrap();
        writer.write(dir).unwrap();
    }

    #[test]
    fn test_open_shard() {
        let temp_dir = tempdir().unwrap();
        setup_shard(temp_dir.path());

        for mode in [LoadMode::Resident, LoadMode::Mapped] {
            let shard = Shard::open(temp_dir.path(), mode, true).unwrap();
            assert_eq!(shard.doc_count(), 3);
            // 3 separators + 31 text bytes + sentinel
            assert_eq!(shard.size(), 35);
            assert!(shard.has_metadata());
        }
    }

    #[test]
    fn test_open_without_metadata_ignores_meta_files() {
        let temp_dir = tempdir().unwrap();
        setup_shard(temp_dir.path());
        fs::remove_file(temp_dir.path().join(META_INDEX_FILE)).unwrap();

        let shard = Shard::open(temp_dir.path(), LoadMode::Mapped, false).unwrap();
        assert!(!shard.has_metadata());

        let err = Shard::open(temp_dir.path(), LoadMode::Mapped, true).err().unwrap();
        assert!(matches!(err, Error::MissingFile(_)));
    }

    #[test]
    fn test_open_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let err = Shard::open(&temp_dir.path().join("nope"), LoadMode::Mapped, false)
            .err()
            .unwrap();
        assert!(matches!(err, Error::ShardNotFound(_)));
    }

    #[test]
    fn test_open_empty_offsets() {
        let temp_dir = tempdir().unwrap();
        setup_shard(temp_dir.path());
        fs::write(temp_dir.path().join(DATA_OFFSET_FILE), b"").unwrap();

        let err = Shard::open(temp_dir.path(), LoadMode::Resident, false)
            .err()
            .unwrap();
        assert!(matches!(err, Error::EmptyOffsets(_)));
    }
}
