//! Error types for the layered image model.
//!
//! Operators and codecs surface every failure immediately; there is no local
//! recovery beyond the defaults each operator documents explicitly.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the core image model.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced layer is absent from the image.
    #[error("no layer named {name:?} in image")]
    NotFound {
        /// The layer name that was requested.
        name: String,
    },

    /// A buffer, channel count, or resolution is incompatible with the
    /// requested construction or operation.
    #[error("shape mismatch: {reason}")]
    ShapeMismatch {
        /// Description of the incompatibility.
        reason: String,
    },

    /// A scalar or expression parameter is malformed or out of range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the offending parameter.
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::NotFound`] error.
    #[inline]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an [`Error::ShapeMismatch`] error.
    #[inline]
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}
