//! Common error types for logic tree operations

use thiserror::Error;

/// Common result type for logic tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error conditions surfaced by the logic tree core
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree byte stream could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path label is not a sequence of underscore-separated positive integers
    #[error("Malformed path label: {0}")]
    MalformedLabel(String),

    /// Tree has no branching levels
    #[error("Logic tree has no branching levels")]
    EmptyTree,

    /// Branching level index past the end of the tree
    #[error("Branching level {index} out of range (tree depth {depth})")]
    LevelOutOfRange { index: usize, depth: usize },

    /// Branch id does not exist at the given level
    #[error("Branch {relative_id} out of range at level {level} ({count} branches)")]
    BranchOutOfRange {
        level: usize,
        relative_id: u32,
        count: usize,
    },

    /// Path label length differs from the tree depth
    #[error("Path label has {found} segments, tree depth is {expected}")]
    PathLength { expected: usize, found: usize },

    /// Number of complete paths does not fit in usize
    #[error("Logic tree has too many paths to count ({depth} levels)")]
    PathCountOverflow { depth: usize },

    /// Level has no branch with positive weight
    #[error("Branching level {0} has no branch with positive weight")]
    EmptyLevel(usize),

    /// Cumulative weights never reached the random draw
    #[error("Sampling underflow at level {level}: draw {draw} exceeds weight sum {total}")]
    SamplingUnderflow { level: usize, draw: f64, total: f64 },

    /// Branching level failed validation
    #[error("Invalid branching level {level}: {reason}")]
    InvalidLevel { level: usize, reason: String },
}
