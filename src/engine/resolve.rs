//! Rank to document resolution

use super::types::ResolvedDocument;
use crate::index::{Rank, SelfIndex};
use crate::shard::Shard;

/// Resolve `rank` of `shard` to its owning document
///
/// `doc_base` is the global index of the shard's first document. The rank
/// must already be checked against the shard size.
pub fn resolve_rank<I: SelfIndex>(
    shard: &Shard<I>,
    doc_base: u64,
    rank: Rank,
) -> ResolvedDocument {
    let ptr = shard.text_index().invert(rank);
    let offsets = shard.doc_offsets();
    let d = offsets.find_owner(ptr);

    ResolvedDocument {
        doc_ix: doc_base + d as u64,
        local_doc_ix: d,
        ptr,
        doc_start: offsets.get(d) + 1,
        doc_end: offsets.get(d + 1),
    }
}

/// Global index of each shard's first document
pub fn doc_bases<I: SelfIndex>(shards: &[Shard<I>]) -> Vec<u64> {
    shards
        .iter()
        .scan(0u64, |base, shard| {
            let first = *base;
            *base += shard.doc_count();
            Some(first)
        })
        .collect()
}
