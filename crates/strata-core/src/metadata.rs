//! Free-form metadata attached to layers and images.

use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping of metadata keys to values.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A single metadata value.
///
/// Codecs round-trip these where the file format supports it; everything
/// else treats metadata as opaque.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
}

impl MetaValue {
    /// Returns the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Integer(i) => write!(f, "{i}"),
            MetaValue::Real(r) => write!(f, "{r}"),
            MetaValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Integer(i)
    }
}

impl From<f64> for MetaValue {
    fn from(r: f64) -> Self {
        MetaValue::Real(r)
    }
}
