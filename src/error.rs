use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fmshard operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Shard directory does not exist: {0}")]
    ShardNotFound(PathBuf),

    #[error("Required shard file is missing: {0}")]
    MissingFile(PathBuf),

    #[error("Offset table is empty: {0}")]
    EmptyOffsets(PathBuf),

    #[error("Corrupt index file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Engine needs at least one shard")]
    NoShards,

    #[error("Shard index {shard} out of range: engine has {num_shards} shards")]
    ShardOutOfRange { shard: usize, num_shards: usize },

    #[error("Rank {rank} out of range for shard {shard} of size {size}")]
    RankOutOfRange { shard: usize, rank: u64, size: u64 },

    #[error("Occurrence {occ} requested but the query only has {count} occurrences")]
    OccurrenceOutOfRange { occ: u64, count: u64 },

    #[error("Text contains the index sentinel byte at position {position}")]
    SentinelInText { position: u64 },

    #[error("Reserved byte 0x{byte:02x} found in document {doc}")]
    ReservedByte { byte: u8, doc: u64 },

    #[error(
        "Failed to decode document text as UTF-8 (the context window probably cut a multi-byte character; try a different max context length): {0}"
    )]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl Error {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by the caller rather than by the index
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::ShardOutOfRange { .. }
                | Error::RankOutOfRange { .. }
                | Error::OccurrenceOutOfRange { .. }
        )
    }
}

/// Result type alias for fmshard operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RankOutOfRange {
            shard: 1,
            rank: 99,
            size: 10,
        };
        assert_eq!(err.to_string(), "Rank 99 out of range for shard 1 of size 10");

        let err = Error::corrupt("/tmp/data.fm", "bad magic number");
        assert_eq!(
            err.to_string(),
            "Corrupt index file /tmp/data.fm: bad magic number"
        );
    }

    #[test]
    fn test_precondition_classification() {
        assert!(Error::OccurrenceOutOfRange { occ: 3, count: 2 }.is_precondition());
        assert!(Error::ShardOutOfRange { shard: 2, num_shards: 1 }.is_precondition());
        assert!(!Error::NoShards.is_precondition());
        assert!(!Error::EmptyOffsets(PathBuf::from("x")).is_precondition());
    }
}
