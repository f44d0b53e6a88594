//! Shards: independently loadable partitions of the corpus
//!
//! A shard directory holds four files:
//!
//! - `data.fm`: self-index over the separator-delimited document text
//! - `data_offset`: little-endian u64 start position of every document
//! - `meta.fm`: self-index over newline-terminated metadata records
//! - `meta_offset`: little-endian u64 start position of every record
//!
//! The metadata pair is optional at load time.

pub mod build;
pub mod offsets;
pub mod reader;
pub mod writer;

pub const DATA_INDEX_FILE: &str = "data.fm";
pub const DATA_OFFSET_FILE: &str = "data_offset";
pub const META_INDEX_FILE: &str = "meta.fm";
pub const META_OFFSET_FILE: &str = "meta_offset";

pub use build::{BuildOptions, BuildReport, CONFIG_FILE, build_shards};
pub use offsets::OffsetTable;
pub use reader::{MetaStore, Shard};
pub use writer::{ShardSummary, ShardWriter};
