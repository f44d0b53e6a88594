//! # fmshard - sharded FM-index substring search
//!
//! fmshard answers exact substring queries over a corpus of documents that
//! is split into shards, each holding a compressed self-index of its text.
//! For any occurrence it returns the owning document and a bounded context
//! window, plus the document's metadata record.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - FM-index construction, serialization and querying
//! - [`shard`] - Shard directories: building, loading, offset tables
//! - [`engine`] - Locating, resolving and extracting across shards
//! - [`config`] - Engine configuration and load modes
//! - [`output`] - Terminal formatting of results
//! - [`utils`] - Progress reporting
//!
//! ## Quick Start
//!
//! ```ignore
//! use fmshard::{Engine, EngineConfig};
//!
//! let configs = EngineConfig::from_file("/idx/fmshard.json".as_ref())?;
//! let engine = Engine::open(&configs[0])?;
//!
//! println!("{} occurrences", engine.count(b"hello"));
//! let doc = engine.get_doc_by_occurrence(b"hello", 0, 80)?;
//! println!("{}", doc.text_str()?);
//! ```
//!
//! ## Memory
//!
//! Shards are loaded either resident (files read into memory) or mapped
//! (memory-mapped, paged in on demand). Loaded shards are immutable, so one
//! engine serves concurrent queries without locking.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod output;
pub mod shard;
pub mod utils;

pub use config::{EngineConfig, LoadMode};
pub use engine::{DocResult, Engine, FindResult, Occurrence, ResolvedDocument, Segment};
pub use error::{Error, Result};
pub use index::{FmIndex, SelfIndex};
pub use shard::Shard;
