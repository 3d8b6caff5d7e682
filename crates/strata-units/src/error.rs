//! Error types for dimension-expression parsing and resolution.

use thiserror::Error;

/// Result type alias using [`UnitsError`] as the error type.
pub type UnitsResult<T> = std::result::Result<T, UnitsError>;

/// Errors that can occur while parsing or resolving dimension expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitsError {
    /// The unit suffix is not in the recognized set.
    ///
    /// Recognized suffixes: `px`, `w`, `vw`, `h`, `vh`, `min`, `vmin`,
    /// `max`, `vmax`.
    #[error("unknown unit of measure: {0:?}")]
    InvalidUnit(String),

    /// The expression could not be split into a magnitude and a unit.
    #[error("malformed dimension expression: {0:?}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_unit_message() {
        let err = UnitsError::InvalidUnit("em".into());
        assert!(err.to_string().contains("em"));
    }

    #[test]
    fn test_malformed_message() {
        let err = UnitsError::Malformed("px5".into());
        assert!(err.to_string().contains("px5"));
    }
}
