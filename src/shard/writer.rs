//! Shard writer
//!
//! Lays out documents the way the query engine expects them:
//! - text: every document preceded by one separator byte (0xFF)
//! - metadata: one record per document, each terminated by a newline
//! - offset tables: start position of each document / record
//!
//! then builds both self-indexes and writes the four shard files.

use super::{DATA_INDEX_FILE, DATA_OFFSET_FILE, META_INDEX_FILE, META_OFFSET_FILE};
use crate::error::{Error, Result};
use crate::index::types::{IndexConfig, SENTINEL_BYTE, SEPARATOR_BYTE};
use crate::index::{FmIndexBuilder, FmIndexWriter};
use anyhow::Context;
use std::path::Path;

/// Accumulates documents for one shard
pub struct ShardWriter {
    config: IndexConfig,
    text: Vec<u8>,
    meta: Vec<u8>,
    doc_offsets: Vec<u64>,
    meta_offsets: Vec<u64>,
}

/// What was written for one shard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSummary {
    pub doc_count: u64,
    pub text_len: u64,
    pub meta_len: u64,
}

impl ShardWriter {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            text: Vec::new(),
            meta: Vec::new(),
            doc_offsets: Vec::new(),
            meta_offsets: Vec::new(),
        }
    }

    /// Create a writer with default index configuration
    pub fn with_defaults() -> Self {
        Self::new(IndexConfig::default())
    }

    /// Append a document and its metadata record
    ///
    /// Document text must not contain the separator or the sentinel byte;
    /// metadata must not contain the sentinel byte.
    pub fn add_document(&mut self, content: &[u8], meta: &[u8]) -> Result<()> {
        let doc = self.doc_offsets.len() as u64;
        if let Some(pos) = memchr::memchr2(SEPARATOR_BYTE, SENTINEL_BYTE, content) {
            return Err(Error::ReservedByte {
                byte: content[pos],
                doc,
            });
        }
        if memchr::memchr(SENTINEL_BYTE, meta).is_some() {
            return Err(Error::ReservedByte {
                byte: SENTINEL_BYTE,
                doc,
            });
        }

        self.doc_offsets.push(self.text.len() as u64);
        self.text.push(SEPARATOR_BYTE);
        self.text.extend_from_slice(content);

        self.meta_offsets.push(self.meta.len() as u64);
        self.meta.extend_from_slice(meta);
        self.meta.push(b'\n');

        Ok(())
    }

    /// Get the number of documents added
    pub fn doc_count(&self) -> usize {
        self.doc_offsets.len()
    }

    /// Get the current size of accumulated text
    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_offsets.is_empty()
    }

    /// Build both indexes and write the shard files into `dir`
    pub fn write(&self, dir: &Path) -> anyhow::Result<ShardSummary> {
        if self.is_empty() {
            anyhow::bail!("Refusing to write shard {} with no documents", dir.display());
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let builder = FmIndexBuilder::new(self.config.clone());
        let (text_index, meta_index) =
            rayon::join(|| builder.build(&self.text), || builder.build(&self.meta));

        FmIndexWriter::write(&dir.join(DATA_INDEX_FILE), &text_index?)?;
        FmIndexWriter::write_offsets(&dir.join(DATA_OFFSET_FILE), &self.doc_offsets)?;
        FmIndexWriter::write(&dir.join(META_INDEX_FILE), &meta_index?)?;
        FmIndexWriter::write_offsets(&dir.join(META_OFFSET_FILE), &self.meta_offsets)?;

        let summary = ShardSummary {
            doc_count: self.doc_offsets.len() as u64,
            text_len: self.text.len() as u64,
            meta_len: self.meta.len() as u64,
        };
        tracing::debug!(
            dir = %dir.display(),
            doc_count = summary.doc_count,
            text_len = summary.text_len,
            "shard written"
        );
        Ok(summary)
    }
}
