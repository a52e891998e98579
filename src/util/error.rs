//! Error types for the geometry cache library.

use std::path::PathBuf;
use thiserror::Error;

use crate::util::FrameIndex;

/// Main error type for geometry cache operations.
///
/// Errors are produced by decode callbacks and stream handles. The playback
/// tick path never sees them directly: the streaming backend absorbs decode
/// failures and reports "no frame" to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Source file or stream does not exist or cannot be accessed
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Requested frame lies outside the stream's range
    #[error("Frame {index} out of range [{start}, {end})")]
    FrameOutOfRange {
        index: FrameIndex,
        start: FrameIndex,
        end: FrameIndex,
    },

    /// Decoded payload is malformed or inconsistent
    #[error("Invalid frame data: {0}")]
    InvalidFrameData(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid-frame-data error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFrameData(msg.into())
    }
}

/// Result type alias for geometry cache operations.
pub type Result<T> = std::result::Result<T, Error>;
