//! Query result types

use crate::config::LoadMode;
use crate::error::Result;
use crate::index::{Rank, TextPosition};
use serde::{Serialize, Serializer};
use std::ops::Range;

/// Half-open interval `[lo, hi)` of suffix-array ranks in one shard
///
/// `lo == hi` means no match; the bounds of an empty segment carry no
/// meaning beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Segment {
    pub lo: Rank,
    pub hi: Rank,
}

impl Segment {
    pub fn new(lo: Rank, hi: Rank) -> Self {
        Self { lo, hi }
    }

    /// Number of occurrences in this segment
    #[inline]
    pub fn width(&self) -> u64 {
        self.hi - self.lo
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    #[inline]
    pub fn contains(&self, rank: Rank) -> bool {
        self.lo <= rank && rank < self.hi
    }

    pub fn ranks(&self) -> Range<Rank> {
        self.lo..self.hi
    }
}

impl From<Range<Rank>> for Segment {
    fn from(range: Range<Rank>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Occurrences of a query across every shard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FindResult {
    /// Total number of occurrences
    pub count: u64,
    /// One segment per shard, in shard order
    pub segment_by_shard: Vec<Segment>,
}

impl FindResult {
    /// Shards with at least one occurrence, with their segments
    pub fn matching_shards(&self) -> impl Iterator<Item = (usize, Segment)> + '_ {
        self.segment_by_shard
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, seg)| !seg.is_empty())
    }
}

/// One occurrence: a rank inside a shard's segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub shard: usize,
    pub rank: Rank,
}

/// The document a rank falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDocument {
    /// Global document index across all shards
    pub doc_ix: u64,
    /// Document index within its shard
    pub local_doc_ix: usize,
    /// Text position the rank originates from
    pub ptr: TextPosition,
    /// First byte of the document (after its separator)
    pub doc_start: TextPosition,
    /// One past the last byte of the document
    pub doc_end: TextPosition,
}

impl ResolvedDocument {
    pub fn doc_len(&self) -> u64 {
        self.doc_end.saturating_sub(self.doc_start)
    }
}

/// A context window around one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocResult {
    pub doc_ix: u64,
    pub doc_len: u64,
    /// Window start, relative to the document start
    pub disp_start: u64,
    pub disp_len: u64,
    /// Where the occurrence begins inside `text`
    pub needle_offset: u64,
    #[serde(serialize_with = "lossy")]
    pub metadata: Vec<u8>,
    #[serde(serialize_with = "lossy")]
    pub text: Vec<u8>,
}

impl DocResult {
    /// Window text as UTF-8
    ///
    /// Fails when the window boundary splits a multi-byte character; the
    /// error reports the byte position of the first invalid sequence.
    pub fn text_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.text)?)
    }

    /// Metadata record as UTF-8
    pub fn metadata_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.metadata)?)
    }

    /// Split the window into plain and highlighted spans
    ///
    /// Every non-overlapping occurrence of `needle` becomes a highlighted
    /// span; the spans cover `text` exactly, in order.
    pub fn spans<'a>(&'a self, needle: &[u8]) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        if needle.is_empty() {
            if !self.text.is_empty() {
                spans.push(Span::Plain(&self.text));
            }
            return spans;
        }

        let mut last = 0;
        for start in memchr::memmem::find_iter(&self.text, needle) {
            if start < last {
                continue;
            }
            if start > last {
                spans.push(Span::Plain(&self.text[last..start]));
            }
            let end = start + needle.len();
            spans.push(Span::Highlight(&self.text[start..end]));
            last = end;
        }
        if last < self.text.len() {
            spans.push(Span::Plain(&self.text[last..]));
        }
        spans
    }

    /// Split the window around the occurrence it was extracted for
    ///
    /// Highlights `[needle_offset, needle_offset + needle_len)`, clipped to
    /// the window.
    pub fn needle_spans(&self, needle_len: u64) -> Vec<Span<'_>> {
        let len = self.text.len();
        let start = (self.needle_offset as usize).min(len);
        let end = start.saturating_add(needle_len as usize).min(len);

        let mut spans = Vec::new();
        if start > 0 {
            spans.push(Span::Plain(&self.text[..start]));
        }
        if end > start {
            spans.push(Span::Highlight(&self.text[start..end]));
        }
        if end < len {
            spans.push(Span::Plain(&self.text[end..]));
        }
        spans
    }
}

/// A piece of a [`DocResult`] window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a [u8]),
    Highlight(&'a [u8]),
}

impl<'a> Span<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        match self {
            Span::Plain(b) | Span::Highlight(b) => b,
        }
    }

    pub fn is_highlight(&self) -> bool {
        matches!(self, Span::Highlight(_))
    }
}

fn lossy<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Size figures of one loaded shard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShardStats {
    pub shard: usize,
    pub doc_count: u64,
    /// Indexed text length, separators included
    pub text_len: u64,
    /// Indexed metadata length, when metadata is loaded
    pub meta_len: Option<u64>,
}

/// Size figures of a whole engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// `None` for engines assembled from in-memory shards
    pub load_mode: Option<LoadMode>,
    pub doc_count: u64,
    pub text_len: u64,
    pub shards: Vec<ShardStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &[u8]) -> DocResult {
        DocResult {
            doc_ix: 0,
            doc_len: text.len() as u64,
            disp_start: 0,
            disp_len: text.len() as u64,
            needle_offset: 0,
            metadata: Vec::new(),
            text: text.to_vec(),
        }
    }

    #[test]
    fn test_segment() {
        let seg = Segment::from(3..7);
        assert_eq!(seg.width(), 4);
        assert!(seg.contains(3));
        assert!(!seg.contains(7));
        assert!(Segment::new(5, 5).is_empty());
    }

    #[test]
    fn test_matching_shards() {
        let result = FindResult {
            count: 3,
            segment_by_shard: vec![Segment::new(1, 3), Segment::new(4, 4), Segment::new(0, 1)],
        };
        let shards: Vec<usize> = result.matching_shards().map(|(s, _)| s).collect();
        assert_eq!(shards, vec![0, 2]);
    }

    #[test]
    fn test_spans() {
        let d = doc(b"say hello, hello!");
        let spans = d.spans(b"hello");
        assert_eq!(
            spans,
            vec![
                Span::Plain(b"say "),
                Span::Highlight(b"hello"),
                Span::Plain(b", "),
                Span::Highlight(b"hello"),
                Span::Plain(b"!"),
            ]
        );
        let joined: Vec<u8> = spans.iter().flat_map(|s| s.bytes().to_vec()).collect();
        assert_eq!(joined, d.text);
    }

    #[test]
    fn test_spans_overlapping_needle() {
        let d = doc(b"aaaa");
        let spans = d.spans(b"aa");
        assert_eq!(spans, vec![Span::Highlight(b"aa"), Span::Highlight(b"aa")]);
    }

    #[test]
    fn test_spans_empty_needle() {
        assert_eq!(doc(b"abc").spans(b""), vec![Span::Plain(b"abc")]);
        assert!(doc(b"").spans(b"x").is_empty());
    }

    #[test]
    fn test_needle_spans() {
        let mut d = doc(b"say hello, hello!");
        d.needle_offset = 11;
        assert_eq!(
            d.needle_spans(5),
            vec![
                Span::Plain(b"say hello, "),
                Span::Highlight(b"hello"),
                Span::Plain(b"!"),
            ]
        );

        // Clipped at the window end
        assert_eq!(
            d.needle_spans(100),
            vec![Span::Plain(b"say hello, "), Span::Highlight(b"hello!")]
        );

        d.needle_offset = 0;
        assert_eq!(d.needle_spans(0), vec![Span::Plain(b"say hello, hello!")]);
        assert!(doc(b"").needle_spans(3).is_empty());
    }

    #[test]
    fn test_text_str_split_character() {
        assert_eq!(doc("héllo".as_bytes()).text_str().unwrap(), "héllo");
        // Window ends in the middle of 'é'
        let cut = doc(&"hé".as_bytes()[..2]);
        assert!(matches!(cut.text_str(), Err(crate::Error::InvalidUtf8(_))));
    }

    #[test]
    fn test_serialize_lossy() {
        let mut d = doc(b"ok\xff");
        d.metadata = b"{}".to_vec();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["text"], "ok\u{FFFD}");
        assert_eq!(json["metadata"], "{}");
    }
}
