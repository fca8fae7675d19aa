//! Error types for usage queries and export.

use std::io;

use thiserror::Error;

/// Errors that can occur while building usage queries or exporting events.
#[derive(Debug, Error)]
pub enum UsageError {
    /// The window is shorter than one hour.
    #[error("window must be 1h or greater")]
    InvalidWindow,

    /// The end of the range precedes its start.
    #[error("endTime must occur after startTime")]
    InvalidRange,

    /// The iterator was advanced after its final window.
    #[error("usage query iterator is exhausted")]
    Exhausted,

    /// A record could not be serialized to JSON.
    #[error("encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Writing to the output sink failed.
    #[error("write error: {0}")]
    Write(#[source] io::Error),

    /// Reading from the usage store failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored event could not be parsed.
    #[error("malformed event in {key} at line {line}: {source}")]
    Parse {
        /// Object key holding the event.
        key: String,
        /// One-based line number within the object.
        line: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for usage operations.
pub type Result<T> = std::result::Result<T, UsageError>;
