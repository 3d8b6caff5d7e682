//! Single-layer pixel storage.
//!
//! A [`Layer`] holds one rectangular buffer of float samples plus the
//! [`Role`] describing how those samples should be interpreted. Samples are
//! stored row-major, channel-interleaved, top row first, in nominally linear
//! brightness. Layers are value objects: operators never mutate a layer
//! they received, they build new ones.

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::role::Role;

/// One layer of a multi-layer image.
///
/// # Example
///
/// ```
/// use strata_core::{Layer, Role};
///
/// let layer = Layer::filled(4, 2, &[1.0, 0.5, 0.0], Role::Rgb).unwrap();
/// assert_eq!(layer.res(), (4, 2));
/// assert_eq!(layer.depth(), 3);
/// assert_eq!(layer.sample(3, 1, 1), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<f32>,
    role: Role,
    metadata: Metadata,
}

impl Layer {
    /// Creates a layer from raw samples.
    ///
    /// `data` must hold exactly `width * height * depth` samples, `depth`
    /// must be at least 1, and `role` must not imply a different channel
    /// count.
    pub fn new(
        width: usize,
        height: usize,
        depth: usize,
        data: Vec<f32>,
        role: Role,
    ) -> Result<Self> {
        if depth < 1 {
            return Err(Error::shape_mismatch("layer depth must be >= 1"));
        }
        if data.len() != width * height * depth {
            return Err(Error::shape_mismatch(format!(
                "expected {} samples for {}x{}x{}, got {}",
                width * height * depth,
                width,
                height,
                depth,
                data.len()
            )));
        }
        if let Some(expected) = role.depth() {
            if expected != depth {
                return Err(Error::shape_mismatch(format!(
                    "role {:?} expects {} components, received {}",
                    role, expected, depth
                )));
            }
        }
        Ok(Self {
            width,
            height,
            depth,
            data,
            role,
            metadata: Metadata::new(),
        })
    }

    /// Creates a layer where every pixel equals `values`.
    ///
    /// The channel count is the length of `values`.
    pub fn filled(width: usize, height: usize, values: &[f32], role: Role) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::shape_mismatch("fill values must not be empty"));
        }
        let depth = values.len();
        let mut data = Vec::with_capacity(width * height * depth);
        for _ in 0..width * height {
            data.extend_from_slice(values);
        }
        Self::new(width, height, depth, data, role)
    }

    /// Creates an all-zero layer.
    pub fn zeros(width: usize, height: usize, depth: usize, role: Role) -> Result<Self> {
        Self::new(width, height, depth, vec![0.0; width * height * depth], role)
    }

    /// Layer resolution as `(width, height)`, ignoring channels.
    #[inline]
    pub fn res(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Shape as `(width, height, depth)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    /// Layer width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Layer height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of channels (always >= 1).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Semantic role of this layer.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Raw samples, row-major and channel-interleaved.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Per-layer metadata.
    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns one sample. Callers must stay in bounds.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, channel: usize) -> f32 {
        self.data[(y * self.width + x) * self.depth + channel]
    }

    /// Overwrites one sample. Callers must stay in bounds.
    #[inline]
    pub fn put_sample(&mut self, x: usize, y: usize, channel: usize, value: f32) {
        self.data[(y * self.width + x) * self.depth + channel] = value;
    }

    /// Returns a new layer with the same shape, role, and metadata but
    /// different samples.
    pub fn with_data(&self, data: Vec<f32>) -> Result<Self> {
        if data.len() != self.data.len() {
            return Err(Error::shape_mismatch(format!(
                "replacement data holds {} samples, layer holds {}",
                data.len(),
                self.data.len()
            )));
        }
        Ok(Self {
            data,
            metadata: self.metadata.clone(),
            ..*self
        })
    }

    /// Returns a copy of this layer tagged with a different role.
    ///
    /// Fails if the role implies a channel count this layer doesn't have.
    pub fn with_role(&self, role: Role) -> Result<Self> {
        if let Some(expected) = role.depth() {
            if expected != self.depth {
                return Err(Error::shape_mismatch(format!(
                    "role {:?} expects {} components, layer has {}",
                    role, expected, self.depth
                )));
            }
        }
        let mut layer = self.clone();
        layer.role = role;
        Ok(layer)
    }

    /// Returns a copy with the given metadata attached.
    pub fn with_metadata(&self, metadata: Metadata) -> Self {
        let mut layer = self.clone();
        layer.metadata = metadata;
        layer
    }

    /// Minimum and maximum sample values across all channels.
    ///
    /// Returns `(0.0, 0.0)` for an empty layer.
    pub fn bounds(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_sample_count() {
        let result = Layer::new(2, 2, 3, vec![0.0; 11], Role::Rgb);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_validates_role_depth() {
        let result = Layer::new(2, 2, 1, vec![0.0; 4], Role::Rgb);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(Layer::new(2, 2, 0, vec![], Role::None).is_err());
    }

    #[test]
    fn test_filled() {
        let layer = Layer::filled(128, 128, &[1.0, 0.5, 0.0], Role::Rgb).unwrap();
        assert_eq!(layer.shape(), (128, 128, 3));
        for y in 0..128 {
            for x in 0..128 {
                assert_eq!(layer.sample(x, y, 0), 1.0);
                assert_eq!(layer.sample(x, y, 1), 0.5);
                assert_eq!(layer.sample(x, y, 2), 0.0);
            }
        }
    }

    #[test]
    fn test_with_data_preserves_role() {
        let layer = Layer::zeros(2, 2, 1, Role::Matte).unwrap();
        let next = layer.with_data(vec![1.0; 4]).unwrap();
        assert_eq!(next.role(), Role::Matte);
        assert_eq!(next.sample(0, 0, 0), 1.0);
        // Original untouched.
        assert_eq!(layer.sample(0, 0, 0), 0.0);
    }

    #[test]
    fn test_put_sample() {
        let mut layer = Layer::zeros(2, 2, 3, Role::Rgb).unwrap();
        layer.put_sample(1, 0, 2, 0.5);
        assert_eq!(layer.sample(1, 0, 2), 0.5);
        assert_eq!(layer.sample(1, 0, 1), 0.0);
    }

    #[test]
    fn test_with_role_checks_depth() {
        let layer = Layer::zeros(2, 2, 1, Role::None).unwrap();
        assert!(layer.with_role(Role::Matte).is_ok());
        assert!(layer.with_role(Role::Rgb).is_err());
    }

    #[test]
    fn test_bounds() {
        let layer = Layer::new(2, 1, 2, vec![0.25, -1.0, 3.0, 0.0], Role::None).unwrap();
        assert_eq!(layer.bounds(), (-1.0, 3.0));
    }

    #[test]
    fn test_zero_resolution_allowed() {
        let layer = Layer::zeros(0, 0, 1, Role::None).unwrap();
        assert_eq!(layer.res(), (0, 0));
    }
}
