//! Error types for image file I/O.

use thiserror::Error;

/// Errors raised while loading or saving image files.
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error bubbled up from the core image model.
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    /// The file extension maps to no known codec.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The image could not be encoded to the requested format.
    #[error("Encode error: {0}")]
    Encode(String),
}

impl IoError {
    /// Creates an [`IoError::Decode`] error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode(reason.into())
    }

    /// Creates an [`IoError::Encode`] error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode(reason.into())
    }
}

/// Result alias for codec functions.
pub type IoResult<T> = std::result::Result<T, IoError>;
