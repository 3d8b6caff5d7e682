//! # strata-units
//!
//! Dimension expressions for the strata toolkit.
//!
//! Spatial parameters - sizes, positions, offsets, radii, font sizes - can be
//! given in absolute pixels or relative to the resolution of a target image.
//! This crate provides the value types and the resolution rules:
//!
//! - [`Unit`] - the recognized units of measure
//! - [`Length`] - a magnitude plus a unit, resolved against a resolution
//! - [`Couple`] - a two-component value with per-axis units
//!
//! Resolution is a pure function of the expression and the target resolution:
//! resolving the same expression against the same resolution always yields
//! the same pixel value.
//!
//! # Example
//!
//! ```
//! use strata_units::Length;
//!
//! let half_width: Length = "0.5vw".parse().unwrap();
//! assert_eq!(half_width.resolve(512.0, 256.0), 256.0);
//!
//! let absolute = Length::from(12.0);
//! assert_eq!(absolute.resolve(512.0, 256.0), 12.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub use error::{UnitsError, UnitsResult};

use std::fmt;
use std::str::FromStr;

/// Unit of measure for a [`Length`].
///
/// Relative units are fractions of a target resolution supplied at
/// resolution time; `Px` is absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// Absolute pixels (identity).
    #[default]
    Px,
    /// Fraction of the target width.
    Vw,
    /// Fraction of the target height.
    Vh,
    /// Fraction of the smaller target dimension.
    Vmin,
    /// Fraction of the larger target dimension.
    Vmax,
}

impl Unit {
    /// Parses a unit suffix.
    ///
    /// Accepts the short aliases `w`, `h`, `min`, and `max` alongside the
    /// viewport-style names. Matching is case-sensitive.
    pub fn from_suffix(suffix: &str) -> UnitsResult<Self> {
        match suffix {
            "px" => Ok(Unit::Px),
            "w" | "vw" => Ok(Unit::Vw),
            "h" | "vh" => Ok(Unit::Vh),
            "min" | "vmin" => Ok(Unit::Vmin),
            "max" | "vmax" => Ok(Unit::Vmax),
            other => Err(UnitsError::InvalidUnit(other.to_string())),
        }
    }

    /// Returns the canonical suffix for this unit.
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Vmin => "vmin",
            Unit::Vmax => "vmax",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A length or one axis of a position, unit-agnostic until resolved.
///
/// A `Length` pairs a magnitude with a [`Unit`]. Negative and zero
/// magnitudes are legal; offsets use negative lengths routinely.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Length {
    magnitude: f64,
    unit: Unit,
}

impl Length {
    /// Creates a length from a magnitude and unit.
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Creates an absolute pixel length.
    pub fn px(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::Px)
    }

    /// Returns the unresolved magnitude.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Returns the unit of measure.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Resolves this length to pixels against a target resolution.
    ///
    /// `width` and `height` are the pixel dimensions of the target image.
    /// The result is a float; callers sizing buffers round as appropriate.
    pub fn resolve(&self, width: f64, height: f64) -> f64 {
        match self.unit {
            Unit::Px => self.magnitude,
            Unit::Vw => self.magnitude * width,
            Unit::Vh => self.magnitude * height,
            Unit::Vmin => self.magnitude * width.min(height),
            Unit::Vmax => self.magnitude * width.max(height),
        }
    }
}

impl From<f64> for Length {
    fn from(magnitude: f64) -> Self {
        Length::px(magnitude)
    }
}

impl From<i32> for Length {
    fn from(magnitude: i32) -> Self {
        Length::px(magnitude as f64)
    }
}

impl From<(f64, Unit)> for Length {
    fn from((magnitude, unit): (f64, Unit)) -> Self {
        Length::new(magnitude, unit)
    }
}

impl FromStr for Length {
    type Err = UnitsError;

    /// Parses expressions of the form `<number><unit>`, e.g. `"0.5vw"`,
    /// `"-3px"`, `"2h"`. No internal whitespace is permitted.
    fn from_str(s: &str) -> UnitsResult<Self> {
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| UnitsError::Malformed(s.to_string()))?;
        let (number, suffix) = s.split_at(split);
        let magnitude: f64 = number
            .parse()
            .map_err(|_| UnitsError::Malformed(s.to_string()))?;
        let unit = Unit::from_suffix(suffix)?;
        Ok(Length::new(magnitude, unit))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit)
    }
}

/// A two-component size, position, or radius with per-axis units.
///
/// Each component resolves independently: the first against the width axis,
/// the second against the height axis, so `("0.5w", "16px")` is legal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Couple {
    /// Width-axis component.
    pub x: Length,
    /// Height-axis component.
    pub y: Length,
}

impl Couple {
    /// Creates a couple from two lengths (or anything convertible to one).
    pub fn new(x: impl Into<Length>, y: impl Into<Length>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Parses a couple from two expression strings.
    pub fn parse(x: &str, y: &str) -> UnitsResult<Self> {
        Ok(Self {
            x: x.parse()?,
            y: y.parse()?,
        })
    }

    /// Resolves both components against a target resolution.
    ///
    /// Returns `(x, y)` in pixels.
    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (
            self.x.resolve(width, height),
            self.y.resolve(width, height),
        )
    }
}

impl From<(Length, Length)> for Couple {
    fn from((x, y): (Length, Length)) -> Self {
        Couple { x, y }
    }
}

impl From<(f64, f64)> for Couple {
    fn from((x, y): (f64, f64)) -> Self {
        Couple::new(x, y)
    }
}

impl From<(i32, i32)> for Couple {
    fn from((x, y): (i32, i32)) -> Self {
        Couple::new(x, y)
    }
}
