//! Occurrence location across shards

use super::types::{FindResult, Occurrence, Segment};
use crate::error::{Error, Result};
use crate::index::SelfIndex;
use crate::shard::Shard;
use rayon::prelude::*;

/// Backward-search `query` in every shard concurrently
///
/// The empty query matches every row of every shard, the sentinel row
/// included, and never reaches the index.
pub fn locate_all<I: SelfIndex>(shards: &[Shard<I>], query: &[u8]) -> FindResult {
    let segment_by_shard: Vec<Segment> = if query.is_empty() {
        shards.iter().map(|s| Segment::new(0, s.size())).collect()
    } else {
        shards
            .par_iter()
            .map(|s| Segment::from(s.text_index().backward_search(query)))
            .collect()
    };

    let count = segment_by_shard
        .iter()
        .enumerate()
        .map(|(shard, seg)| {
            assert!(
                seg.lo <= seg.hi,
                "shard {} returned inverted interval [{}, {})",
                shard,
                seg.lo,
                seg.hi
            );
            seg.width()
        })
        .sum();

    FindResult {
        count,
        segment_by_shard,
    }
}

/// Map a global occurrence index to its shard and rank
///
/// Occurrences are numbered shard by shard, in rank order within a shard.
pub fn nth_occurrence(result: &FindResult, occ: u64) -> Result<Occurrence> {
    let mut remaining = occ;
    for (shard, seg) in result.segment_by_shard.iter().enumerate() {
        if remaining < seg.width() {
            return Ok(Occurrence {
                shard,
                rank: seg.lo + remaining,
            });
        }
        remaining -= seg.width();
    }
    Err(Error::OccurrenceOutOfRange {
        occ,
        count: result.count,
    })
}
