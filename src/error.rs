//! Error types for bamdex

use thiserror::Error;

/// Result type alias for bamdex operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Error types that can occur while building, querying or decoding an index
#[derive(Debug, Error)]
pub enum IndexError {
    /// Empty or inverted half-open range (genomic or virtual offset)
    #[error("Invalid interval: start ({start}) must be less than end ({end})")]
    InvalidInterval {
        /// Range start
        start: u64,
        /// Range end (exclusive)
        end: u64,
    },

    /// Coordinate beyond the span covered by the binning scheme
    #[error("Position {position} exceeds maximum sequence span {max_span}")]
    OutOfRange {
        /// Offending coordinate
        position: u64,
        /// Largest span the binning scheme can address
        max_span: u64,
    },

    /// Records arrived out of coordinate order
    #[error(
        "Unsorted input on reference {reference_sequence}: {current} follows {previous}"
    )]
    UnsortedInput {
        /// Reference sequence being built
        reference_sequence: u32,
        /// Previously indexed start (or reference id)
        previous: u64,
        /// Offending start (or reference id)
        current: u64,
    },

    /// An earlier build error aborted construction for this reference
    #[error("Index build aborted after an error on reference {reference_sequence}")]
    BuildAborted {
        /// Reference sequence whose build failed
        reference_sequence: u32,
    },

    /// Persisted index is corrupt or truncated
    #[error("Malformed index: {0}")]
    MalformedIndex(String),

    /// Binning or builder configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Shorthand for a [`IndexError::MalformedIndex`] with a formatted message.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        IndexError::MalformedIndex(msg.into())
    }
}
