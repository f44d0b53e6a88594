//! Context window extraction

use super::types::{DocResult, ResolvedDocument};
use crate::index::{SelfIndex, TextPosition};
use crate::shard::Shard;
use rayon::prelude::*;

/// Ranges shorter than this are always extracted sequentially
pub const PARALLEL_EXTRACT_MIN: u64 = 100;
/// Upper bound on concurrent chunks for one range
pub const PARALLEL_EXTRACT_MAX_CHUNKS: u64 = 10;

/// Window bounds `[start, end)` around an occurrence of `needle_len` bytes
///
/// Up to `max_ctx_len` bytes on each side, clipped to the document.
pub fn context_window(
    doc: &ResolvedDocument,
    needle_len: u64,
    max_ctx_len: u64,
) -> (TextPosition, TextPosition) {
    let start = doc.ptr.saturating_sub(max_ctx_len).max(doc.doc_start);
    let end = doc
        .ptr
        .saturating_add(needle_len)
        .saturating_add(max_ctx_len)
        .min(doc.doc_end);
    (start, end)
}

/// Build the snippet for a resolved occurrence
///
/// Ranks originating on a separator or on the sentinel lie outside every
/// document body and get an empty window at the document start.
pub fn extract_doc<I: SelfIndex>(
    shard: &Shard<I>,
    doc: &ResolvedDocument,
    needle_len: u64,
    max_ctx_len: u64,
    parallel: bool,
) -> DocResult {
    let (start, end) = if doc.ptr < doc.doc_start || doc.ptr >= doc.doc_end {
        (doc.doc_start, doc.doc_start)
    } else {
        context_window(doc, needle_len, max_ctx_len)
    };
    let text = if start < end {
        extract_range(shard.text_index(), start, end, parallel)
    } else {
        Vec::new()
    };

    let metadata = match shard.meta() {
        Some(meta) => {
            let d = doc.local_doc_ix;
            let meta_start = meta.offsets.get(d);
            // Drop the record's trailing newline
            let meta_end = meta.offsets.get(d + 1).saturating_sub(1);
            if meta_start < meta_end {
                extract_range(&meta.index, meta_start, meta_end, parallel)
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    };

    DocResult {
        doc_ix: doc.doc_ix,
        doc_len: doc.doc_len(),
        disp_start: start.saturating_sub(doc.doc_start),
        disp_len: text.len() as u64,
        needle_offset: if text.is_empty() {
            0
        } else {
            doc.ptr - start
        },
        metadata,
        text,
    }
}

/// Extract `[start, end)`, splitting long ranges across the rayon pool
///
/// Chunks are concatenated in order, so the result is identical to one
/// sequential extract.
pub fn extract_range<I: SelfIndex>(
    index: &I,
    start: TextPosition,
    end: TextPosition,
    parallel: bool,
) -> Vec<u8> {
    let len = end.saturating_sub(start);
    if !parallel || len < PARALLEL_EXTRACT_MIN {
        return index.extract(start, end);
    }

    let chunk = len.div_ceil(PARALLEL_EXTRACT_MAX_CHUNKS);
    let bounds: Vec<(u64, u64)> = (start..end)
        .step_by(chunk as usize)
        .map(|lo| (lo, (lo + chunk).min(end)))
        .collect();

    let parts: Vec<Vec<u8>> = bounds
        .into_par_iter()
        .map(|(lo, hi)| index.extract(lo, hi))
        .collect();
    parts.concat()
}
