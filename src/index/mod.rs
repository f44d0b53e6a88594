//! Compressed full-text self-index
//!
//! This module provides an FM-index: a BWT-based succinct suffix array that
//! counts, locates and extracts substrings without storing the text.
//!
//! ## Architecture
//!
//! - `builder`: Sorts suffixes and derives BWT, wavelet matrix and samples
//! - `writer`: Persists indexes and offset tables to disk
//! - `fm_index`: The [`SelfIndex`] interface and its resident/mapped reader
//! - `wavelet`, `bitvec`: Rank structures the reader is made of
//! - `storage`: Owned or memory-mapped backing shared by loaded structures
//! - `types`: Core type definitions and file header

pub mod bitvec;
pub mod builder;
pub mod fm_index;
pub mod storage;
pub mod types;
pub mod wavelet;
pub mod writer;

// Re-exports for convenience
pub use builder::{BuiltFmIndex, FmIndexBuilder};
pub use fm_index::{FmIndex, SelfIndex};
pub use storage::Backing;
pub use types::{IndexConfig, Rank, SENTINEL_BYTE, SEPARATOR_BYTE, TextPosition};
pub use writer::FmIndexWriter;
