//! Query engine over a set of shards
//!
//! The engine owns its shards for its whole lifetime and answers three kinds
//! of question:
//!
//! - `find` / `count`: where does a byte string occur (per-shard rank
//!   segments and their total)
//! - `resolve`: which document does a rank belong to
//! - `get_doc_by_rank` / `get_doc_by_occurrence`: a bounded context window
//!   around one occurrence, with the document's metadata record
//!
//! ## Example
//!
//! ```no_run
//! use fmshard::{Engine, EngineConfig, LoadMode};
//!
//! let config = EngineConfig::new(vec!["/idx/shard_0000".into()], LoadMode::Mapped, true);
//! let engine = Engine::open(&config)?;
//!
//! let found = engine.find(b"hello");
//! for (shard, segment) in found.matching_shards() {
//!     let doc = engine.get_doc_by_rank(shard, segment.lo, 5, 80)?;
//!     println!("{}: {}", doc.doc_ix, String::from_utf8_lossy(&doc.text));
//! }
//! # Ok::<(), fmshard::Error>(())
//! ```

pub mod extract;
pub mod locate;
pub mod resolve;
pub mod types;

pub use types::{
    DocResult, EngineStats, FindResult, Occurrence, ResolvedDocument, Segment, ShardStats, Span,
};

use crate::config::{EngineConfig, LoadMode};
use crate::error::{Error, Result};
use crate::index::{FmIndex, Rank, SelfIndex};
use crate::shard::Shard;
use rayon::prelude::*;
use std::time::Instant;

/// Sharded substring search engine
pub struct Engine<I: SelfIndex = FmIndex> {
    shards: Vec<Shard<I>>,
    doc_bases: Vec<u64>,
    load_mode: Option<LoadMode>,
    parallel_extract: bool,
}

impl Engine<FmIndex> {
    /// Load every shard named by `config`
    ///
    /// Shards load concurrently. If any shard fails, the error is returned
    /// and every shard loaded so far is released.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();

        let shards = config
            .index_dirs
            .par_iter()
            .map(|dir| Shard::open(dir, config.load_mode, config.get_metadata))
            .collect::<Result<Vec<_>>>()?;

        let mut engine = Self::from_shards(shards)?.with_parallel_extract(config.parallel_extract);
        engine.load_mode = Some(config.load_mode);

        tracing::info!(
            shards = engine.num_shards(),
            docs = engine.doc_count(),
            mode = ?config.load_mode,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "engine loaded"
        );
        Ok(engine)
    }
}

impl<I: SelfIndex> Engine<I> {
    /// Assemble an engine from already-loaded shards, in shard order
    pub fn from_shards(shards: Vec<Shard<I>>) -> Result<Self> {
        if shards.is_empty() {
            return Err(Error::NoShards);
        }
        let doc_bases = resolve::doc_bases(&shards);
        Ok(Self {
            shards,
            doc_bases,
            load_mode: None,
            parallel_extract: false,
        })
    }

    /// Split long extractions across the rayon pool
    pub fn with_parallel_extract(mut self, enabled: bool) -> Self {
        self.parallel_extract = enabled;
        self
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    pub fn shards(&self) -> &[Shard<I>] {
        &self.shards
    }

    /// Total number of documents across all shards
    pub fn doc_count(&self) -> u64 {
        self.shards.iter().map(Shard::doc_count).sum()
    }

    /// Rank segments of `query` in every shard, plus the total count
    pub fn find(&self, query: &[u8]) -> FindResult {
        let result = locate::locate_all(&self.shards, query);
        tracing::debug!(query_len = query.len(), count = result.count, "find");
        result
    }

    /// Total number of occurrences of `query`
    pub fn count(&self, query: &[u8]) -> u64 {
        self.find(query).count
    }

    /// Map a global occurrence index of a previous `find` to shard and rank
    pub fn locate(&self, found: &FindResult, occ: u64) -> Result<Occurrence> {
        locate::nth_occurrence(found, occ)
    }

    /// Document owning `rank` in `shard`
    pub fn resolve(&self, shard: usize, rank: Rank) -> Result<ResolvedDocument> {
        let s = self.check_rank(shard, rank)?;
        Ok(resolve::resolve_rank(s, self.doc_bases[shard], rank))
    }

    /// Context window around the occurrence at `rank` of `shard`
    ///
    /// The window spans up to `max_ctx_len` bytes before the occurrence and
    /// after its `needle_len` bytes, clipped to the owning document.
    pub fn get_doc_by_rank(
        &self,
        shard: usize,
        rank: Rank,
        needle_len: u64,
        max_ctx_len: u64,
    ) -> Result<DocResult> {
        let s = self.check_rank(shard, rank)?;
        let doc = resolve::resolve_rank(s, self.doc_bases[shard], rank);
        let result = extract::extract_doc(s, &doc, needle_len, max_ctx_len, self.parallel_extract);
        tracing::debug!(
            shard,
            rank,
            doc_ix = result.doc_ix,
            disp_len = result.disp_len,
            "get_doc_by_rank"
        );
        Ok(result)
    }

    /// Context window around the `occ`-th occurrence of `query`
    pub fn get_doc_by_occurrence(
        &self,
        query: &[u8],
        occ: u64,
        max_ctx_len: u64,
    ) -> Result<DocResult> {
        let found = self.find(query);
        let Occurrence { shard, rank } = self.locate(&found, occ)?;
        self.get_doc_by_rank(shard, rank, query.len() as u64, max_ctx_len)
    }

    /// Size figures per shard and in total
    pub fn stats(&self) -> EngineStats {
        let shards: Vec<ShardStats> = self
            .shards
            .iter()
            .enumerate()
            .map(|(i, s)| ShardStats {
                shard: i,
                doc_count: s.doc_count(),
                text_len: s.size() - 1,
                meta_len: s.meta().map(|m| m.index.size() - 1),
            })
            .collect();
        EngineStats {
            load_mode: self.load_mode,
            doc_count: shards.iter().map(|s| s.doc_count).sum(),
            text_len: shards.iter().map(|s| s.text_len).sum(),
            shards,
        }
    }

    fn check_rank(&self, shard: usize, rank: Rank) -> Result<&Shard<I>> {
        let s = self.shards.get(shard).ok_or(Error::ShardOutOfRange {
            shard,
            num_shards: self.shards.len(),
        })?;
        if rank >= s.size() {
            return Err(Error::RankOutOfRange {
                shard,
                rank,
                size: s.size(),
            });
        }
        Ok(s)
    }
}
