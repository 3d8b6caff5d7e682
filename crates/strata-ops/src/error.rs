//! Error types for image operators.

use thiserror::Error;

/// Errors raised by image operators.
#[derive(Error, Debug)]
pub enum OpsError {
    /// An error bubbled up from the core image model.
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    /// A dimension expression failed to parse or resolve.
    #[error(transparent)]
    Units(#[from] strata_units::UnitsError),

    /// An operator received a parameter outside its documented domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A resampling operator was asked for an interpolation order it does
    /// not implement.
    #[error("Unsupported interpolation order: {0} (expected 0, 1, or 3)")]
    UnsupportedInterpolation(i64),

    /// A font file referenced by the text operator does not exist.
    #[error("Font not found: {0}")]
    FontNotFound(String),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidParameter`] error.
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter(reason.into())
    }

    /// Creates an [`OpsError::Core`] shape mismatch error.
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::Core(strata_core::Error::shape_mismatch(reason))
    }

    /// Creates an [`OpsError::FontNotFound`] error.
    pub fn font_not_found(font: impl Into<String>) -> Self {
        Self::FontNotFound(font.into())
    }
}

/// Result alias for operator functions.
pub type OpsResult<T> = std::result::Result<T, OpsError>;
