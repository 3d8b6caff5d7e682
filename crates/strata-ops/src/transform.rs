//! Geometric layer transforms: offset, resize, scale, and affine warps.

use strata_core::{Image, Layer};
use strata_units::Couple;
use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::sampler::{Filter, resize_samples, sample_at};

/// 2-D affine transform mapping `(x, y)` to
/// `(a*x + b*y + tx, c*x + d*y + ty)` in row-index coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    tx: f32,
    ty: f32,
}

impl Affine {
    /// Pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx,
            ty,
        }
    }

    /// Per-axis scaling about the origin.
    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Rotation about the origin. Positive angles turn toward increasing
    /// row indices (clockwise on screen).
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: -sin,
            c: sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Returns the transform applying `self` first, then `next`.
    pub fn then(self, next: Affine) -> Self {
        Self {
            a: next.a * self.a + next.b * self.c,
            b: next.a * self.b + next.b * self.d,
            c: next.c * self.a + next.d * self.c,
            d: next.c * self.b + next.d * self.d,
            tx: next.a * self.tx + next.b * self.ty + next.tx,
            ty: next.c * self.tx + next.d * self.ty + next.ty,
        }
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            tx: (self.b * self.ty - self.d * self.tx) * inv,
            ty: (self.c * self.tx - self.a * self.ty) * inv,
        })
    }

    /// Transforms one point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.b * y + self.tx,
            self.c * x + self.d * y + self.ty,
        )
    }
}

/// Warps a layer through an affine transform onto a new canvas.
///
/// `transform` maps source coordinates to destination coordinates; each
/// destination pixel is inverse-mapped and reconstructed with `filter`.
/// Samples pulled from outside the source extent are zero. Fails when the
/// transform is singular.
pub fn warp_affine(
    layer: &Layer,
    transform: &Affine,
    res: (usize, usize),
    filter: Filter,
) -> OpsResult<Layer> {
    let (src_w, src_h, depth) = layer.shape();
    let (dst_w, dst_h) = res;
    let inverse = transform
        .invert()
        .ok_or_else(|| OpsError::invalid_parameter("warp transform is not invertible"))?;

    let src = layer.data();
    let mut data = vec![0.0f32; dst_w * dst_h * depth];
    let mut px = vec![0.0f32; depth];
    for y in 0..dst_h {
        for x in 0..dst_w {
            let (sx, sy) = inverse.apply(x as f32, y as f32);
            sample_at(src, src_w, src_h, depth, sx, sy, filter, &mut px);
            let idx = (y * dst_w + x) * depth;
            data[idx..idx + depth].copy_from_slice(&px);
        }
    }
    Ok(Layer::new(dst_w, dst_h, depth, data, layer.role())?)
}

/// How [`offset`] treats samples shifted past the layer border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMode {
    /// Samples wrap around to the opposite edge (toroidal shift).
    #[default]
    Wrap,
    /// Vacated samples are filled with zero; shifted-out samples are lost.
    Zero,
}

/// Translates matching layers by a whole number of pixels.
///
/// The shift is resolved per layer, so relative units track each layer's
/// own resolution, then rounded to integers. Positive x moves content
/// right; positive y moves content up, matching the bottom-left origin
/// used by [`crate::composite`] and [`crate::text`].
pub fn offset(image: &Image, layers: &str, amount: &Couple, mode: OffsetMode) -> OpsResult<Image> {
    let selected = image.match_layer_names(layers)?;
    let mut result = image.clone();
    for name in selected {
        let layer = image.layer(&name)?;
        let (width, height, depth) = layer.shape();
        let (dx, dy) = amount.resolve(width as f64, height as f64);
        let dx = dx.round() as isize;
        // Row index grows downward, so an upward shift subtracts rows.
        let dy = -(dy.round() as isize);
        debug!(layer = name.as_str(), dx, dy, ?mode, "offset");

        let src = layer.data();
        let mut data = vec![0.0f32; src.len()];
        for y in 0..height as isize {
            for x in 0..width as isize {
                let (sx, sy) = (x - dx, y - dy);
                let src_idx = match mode {
                    OffsetMode::Wrap => {
                        let sx = sx.rem_euclid(width as isize) as usize;
                        let sy = sy.rem_euclid(height as isize) as usize;
                        (sy * width + sx) * depth
                    }
                    OffsetMode::Zero => {
                        if sx < 0 || sy < 0 || sx >= width as isize || sy >= height as isize {
                            continue;
                        }
                        (sy as usize * width + sx as usize) * depth
                    }
                };
                let dst_idx = (y as usize * width + x as usize) * depth;
                data[dst_idx..dst_idx + depth].copy_from_slice(&src[src_idx..src_idx + depth]);
            }
        }
        result = result.with_layer(name, layer.with_data(data)?);
    }
    Ok(result)
}

/// Resamples matching layers to an explicit resolution.
///
/// `res` components are resolved against each layer's current resolution,
/// so `("0.5w", "0.5h")` halves every matching layer. `order` selects the
/// reconstruction filter (0, 1, or 3). Targets below one pixel are
/// rejected; a target equal to the current resolution passes the layer
/// through bit-for-bit.
pub fn resize(image: &Image, layers: &str, res: &Couple, order: i64) -> OpsResult<Image> {
    let filter = Filter::from_order(order)?;
    let selected = image.match_layer_names(layers)?;
    let mut result = image.clone();
    for name in selected {
        let layer = image.layer(&name)?;
        let (width, height, depth) = layer.shape();
        let (tw, th) = res.resolve(width as f64, height as f64);
        let (tw, th) = (tw.round() as i64, th.round() as i64);
        if tw < 1 || th < 1 {
            return Err(OpsError::invalid_parameter(format!(
                "resize target for layer {name:?} is {tw}x{th}; must be at least 1x1"
            )));
        }
        // A no-op resize is exact, never refiltered.
        if (tw as usize, th as usize) == (width, height) {
            continue;
        }
        debug!(
            layer = name.as_str(),
            from = format!("{width}x{height}"),
            to = format!("{tw}x{th}"),
            order,
            "resize"
        );
        let data = resize_samples(
            layer.data(),
            width,
            height,
            depth,
            tw as usize,
            th as usize,
            filter,
        )?;
        let resized = Layer::new(tw as usize, th as usize, depth, data, layer.role())?
            .with_metadata(layer.metadata().clone());
        result = result.with_layer(name, resized);
    }
    Ok(result)
}

/// Resamples matching layers by per-axis factors.
///
/// A factor of 2 doubles that axis; factors at or below zero are rejected.
pub fn scale(image: &Image, layers: &str, factors: (f64, f64), order: i64) -> OpsResult<Image> {
    if factors.0 <= 0.0 || factors.1 <= 0.0 {
        return Err(OpsError::invalid_parameter(format!(
            "scale factors must be positive, got ({}, {})",
            factors.0, factors.1
        )));
    }
    let filter = Filter::from_order(order)?;
    let selected = image.match_layer_names(layers)?;
    let mut result = image.clone();
    for name in selected {
        let layer = image.layer(&name)?;
        let (width, height, depth) = layer.shape();
        let tw = ((width as f64 * factors.0).round() as usize).max(1);
        let th = ((height as f64 * factors.1).round() as usize).max(1);
        if (tw, th) == (width, height) {
            continue;
        }
        debug!(
            layer = name.as_str(),
            fx = factors.0,
            fy = factors.1,
            "scale"
        );
        let data = resize_samples(layer.data(), width, height, depth, tw, th, filter)?;
        let scaled = Layer::new(tw, th, depth, data, layer.role())?
            .with_metadata(layer.metadata().clone());
        result = result.with_layer(name, scaled);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strata_core::Role;
    use strata_units::{Length, Unit};

    fn gradient() -> Image {
        // 4x4 single channel, sample value encodes position.
        let data: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let layer = Layer::new(4, 4, 1, data, Role::None).unwrap();
        Image::new().with_layer("M", layer)
    }

    #[test]
    fn test_offset_wraps() {
        let image = gradient();
        let shifted = offset(&image, "*", &Couple::new(1.0, 0.0), OffsetMode::Wrap).unwrap();
        let layer = shifted.layer("M").unwrap();
        // Content moved right by one; rightmost column wrapped to x=0.
        assert_eq!(layer.sample(1, 0, 0), 0.0);
        assert_eq!(layer.sample(0, 0, 0), 3.0);
    }

    #[test]
    fn test_offset_positive_y_moves_up() {
        let image = gradient();
        let shifted = offset(&image, "*", &Couple::new(0.0, 1.0), OffsetMode::Wrap).unwrap();
        let layer = shifted.layer("M").unwrap();
        // Row 1 (values 4..8) moved up into row 0.
        assert_eq!(layer.sample(0, 0, 0), 4.0);
    }

    #[test]
    fn test_offset_zero_mode() {
        let image = gradient();
        let shifted = offset(&image, "*", &Couple::new(2.0, 0.0), OffsetMode::Zero).unwrap();
        let layer = shifted.layer("M").unwrap();
        assert_eq!(layer.sample(0, 0, 0), 0.0);
        assert_eq!(layer.sample(1, 0, 0), 0.0);
        assert_eq!(layer.sample(2, 0, 0), 0.0);
        assert_eq!(layer.sample(3, 0, 0), 1.0);
    }

    #[test]
    fn test_offset_full_cycle_is_identity() {
        let image = gradient();
        let shifted = offset(&image, "*", &Couple::new(4.0, -4.0), OffsetMode::Wrap).unwrap();
        assert_eq!(shifted.layer("M").unwrap(), image.layer("M").unwrap());
    }

    #[test]
    fn test_resize_halves() {
        let layer = Layer::filled(8, 8, &[0.5, 0.25], Role::RedGreen).unwrap();
        let image = Image::new().with_layer("C", layer);
        let res = Couple::new(
            Length::new(0.5, Unit::Vw),
            Length::new(0.5, Unit::Vh),
        );
        let resized = resize(&image, "*", &res, 1).unwrap();
        let layer = resized.layer("C").unwrap();
        assert_eq!(layer.shape(), (4, 4, 2));
        assert_eq!(layer.role(), Role::RedGreen);
        for y in 0..4 {
            for x in 0..4 {
                assert_relative_eq!(layer.sample(x, y, 0), 0.5, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_resize_rejects_bad_order() {
        let image = gradient();
        let res = Couple::new(8.0, 8.0);
        assert!(matches!(
            resize(&image, "*", &res, 2),
            Err(OpsError::UnsupportedInterpolation(2))
        ));
    }

    #[test]
    fn test_resize_rejects_sub_pixel_target() {
        let image = gradient();
        assert!(resize(&image, "*", &Couple::new(0.0, 8.0), 1).is_err());
    }

    #[test]
    fn test_scale_doubles() {
        let image = gradient();
        let scaled = scale(&image, "*", (2.0, 3.0), 0).unwrap();
        assert_eq!(scaled.layer("M").unwrap().res(), (8, 12));
    }

    #[test]
    fn test_resize_zero_resolution_source_rejected() {
        // Zero-resolution layers are legal in the model; resampling one
        // must fail cleanly instead of indexing an empty buffer.
        let image = Image::new().with_layer("M", Layer::zeros(0, 0, 1, Role::None).unwrap());
        let res = Couple::new(8.0, 8.0);
        assert!(matches!(
            resize(&image, "*", &res, 1),
            Err(OpsError::InvalidParameter(_))
        ));
        assert!(scale(&image, "*", (2.0, 2.0), 0).is_err());
    }

    #[test]
    fn test_scale_rejects_non_positive() {
        let image = gradient();
        assert!(scale(&image, "*", (0.0, 1.0), 1).is_err());
        assert!(scale(&image, "*", (1.0, -2.0), 1).is_err());
    }

    #[test]
    fn test_affine_roundtrip() {
        let m = Affine::translation(3.0, -2.0)
            .then(Affine::rotation(0.7))
            .then(Affine::scaling(2.0, 0.5));
        let inv = m.invert().unwrap();
        let (x, y) = m.apply(1.5, -4.0);
        let (bx, by) = inv.apply(x, y);
        assert_relative_eq!(bx, 1.5, epsilon = 1e-4);
        assert_relative_eq!(by, -4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_warp_identity_preserves_samples() {
        let data: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let layer = Layer::new(4, 4, 1, data, Role::None).unwrap();
        let warped =
            warp_affine(&layer, &Affine::translation(0.0, 0.0), (4, 4), Filter::Nearest).unwrap();
        assert_eq!(warped.data(), layer.data());
    }

    #[test]
    fn test_warp_translation_exposes_zeros() {
        let layer = Layer::filled(4, 4, &[1.0], Role::None).unwrap();
        let warped =
            warp_affine(&layer, &Affine::translation(2.0, 0.0), (4, 4), Filter::Nearest).unwrap();
        assert_eq!(warped.sample(0, 0, 0), 0.0);
        assert_eq!(warped.sample(3, 0, 0), 1.0);
    }

    #[test]
    fn test_warp_rejects_singular_transform() {
        let layer = Layer::filled(4, 4, &[1.0], Role::None).unwrap();
        let result = warp_affine(&layer, &Affine::scaling(0.0, 1.0), (4, 4), Filter::Nearest);
        assert!(result.is_err());
    }
}
