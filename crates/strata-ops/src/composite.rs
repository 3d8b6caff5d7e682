//! Masked compositing of one image over another.

use strata_core::{Image, Layer, Role};
use strata_units::{Couple, Length, Unit};
use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::sampler::Filter;
use crate::transform::{Affine, warp_affine};

/// Placement parameters for [`composite`].
#[derive(Debug, Clone)]
pub struct CompositeParams {
    /// Background layer to composite onto.
    pub bglayer: String,
    /// Foreground layer to place.
    pub fglayer: String,
    /// Output layer name; defaults to `bglayer` when `None`.
    pub layer: Option<String>,
    /// Mask layer name looked up in the mask image (or the foreground when
    /// no mask image is given).
    pub masklayer: String,
    /// Interpolation order for the warp: 0, 1, or 3.
    pub order: i64,
    /// Counter-clockwise rotation of the foreground, in degrees.
    pub orientation: f64,
    /// Point of the foreground placed at `position`, resolved against the
    /// foreground resolution. Measured from the bottom-left corner.
    pub pivot: Couple,
    /// Placement point in the background, resolved against the background
    /// resolution. Measured from the bottom-left corner.
    pub position: Couple,
    /// Per-axis scale factors applied to the foreground.
    pub scale: (f64, f64),
}

impl Default for CompositeParams {
    fn default() -> Self {
        Self {
            bglayer: "C".into(),
            fglayer: "C".into(),
            layer: None,
            masklayer: "A".into(),
            order: 3,
            orientation: 0.0,
            pivot: Couple::new(Length::new(0.5, Unit::Vw), Length::new(0.5, Unit::Vh)),
            position: Couple::new(Length::new(0.5, Unit::Vw), Length::new(0.5, Unit::Vh)),
            scale: (1.0, 1.0),
        }
    }
}

/// Composites a foreground layer over a background layer through a mask.
///
/// The foreground is scaled, rotated about its pivot, and translated so the
/// pivot lands at `position` in the background, then blended:
///
/// ```text
/// out = fg * m + bg * (1 - m)
/// ```
///
/// Coverage `m` comes from `masklayer` in the mask image when one is given,
/// otherwise from the foreground's own mask layer, otherwise the foreground
/// is treated as fully opaque. Samples warped from outside the foreground
/// extent carry zero coverage, so the background shows through there. The
/// result holds a single layer at the background's resolution and role.
pub fn composite(
    foreground: &Image,
    background: &Image,
    mask: Option<&Image>,
    params: &CompositeParams,
) -> OpsResult<Image> {
    let bg = background.layer(&params.bglayer)?;
    let fg = foreground.layer(&params.fglayer)?;
    let (bg_w, bg_h, depth) = bg.shape();
    let (fg_w, fg_h, fg_depth) = fg.shape();
    if fg_depth != depth {
        return Err(OpsError::shape_mismatch(format!(
            "foreground has {fg_depth} channels, background has {depth}"
        )));
    }

    let coverage = match mask {
        Some(image) => {
            let layer = image.layer(&params.masklayer)?;
            Some(layer.clone())
        }
        None => foreground.get(&params.masklayer).cloned(),
    };
    if let Some(m) = &coverage {
        if m.depth() != 1 {
            return Err(OpsError::shape_mismatch(format!(
                "mask layer {:?} must have one channel, has {}",
                params.masklayer,
                m.depth()
            )));
        }
        if m.res() != fg.res() {
            return Err(OpsError::shape_mismatch(format!(
                "mask resolution {:?} does not match foreground {:?}",
                m.res(),
                fg.res()
            )));
        }
    }
    let mask_layer = match coverage {
        Some(m) => m,
        None => Layer::filled(fg_w, fg_h, &[1.0], Role::None)?,
    };

    let filter = Filter::from_order(params.order)?;
    let (pivot_x, pivot_y) = params.pivot.resolve(fg_w as f64, fg_h as f64);
    let (pos_x, pos_y) = params.position.resolve(bg_w as f64, bg_h as f64);
    debug!(
        fg = params.fglayer.as_str(),
        bg = params.bglayer.as_str(),
        pivot = format!("({pivot_x}, {pivot_y})"),
        position = format!("({pos_x}, {pos_y})"),
        orientation = params.orientation,
        "composite"
    );

    // Build the forward pivot-to-position transform in row-index
    // coordinates, where "up" means decreasing row. Rotation flips sign for
    // the same reason.
    let forward = Affine::translation(-pivot_x as f32, (pivot_y - fg_h as f64) as f32)
        .then(Affine::scaling(params.scale.0 as f32, params.scale.1 as f32))
        .then(Affine::rotation(-(params.orientation.to_radians()) as f32))
        .then(Affine::translation(
            pos_x as f32,
            (bg_h as f64 - pos_y) as f32,
        ));
    let fg_warped = warp_affine(fg, &forward, (bg_w, bg_h), filter)?;
    let mask_warped = warp_affine(&mask_layer, &forward, (bg_w, bg_h), filter)?;

    let bg_data = bg.data();
    let fg_data = fg_warped.data();
    let m_data = mask_warped.data();
    let mut out = vec![0.0f32; bg_w * bg_h * depth];
    for px in 0..bg_w * bg_h {
        let m = m_data[px].clamp(0.0, 1.0);
        let idx = px * depth;
        for c in 0..depth {
            out[idx + c] = fg_data[idx + c] * m + bg_data[idx + c] * (1.0 - m);
        }
    }

    let name = params.layer.as_deref().unwrap_or(&params.bglayer);
    let layer = Layer::new(bg_w, bg_h, depth, out, bg.role())?;
    Ok(Image::new().with_layer(name, layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid(value: f32, size: usize) -> Image {
        let layer = Layer::filled(size, size, &[value], Role::None).unwrap();
        Image::new().with_layer("C", layer)
    }

    #[test]
    fn test_opaque_centered_overwrites() {
        // Same-size images, pivot == position, opaque mask: the foreground
        // replaces the background wholesale.
        let fg = solid(1.0, 8);
        let bg = solid(0.0, 8);
        let params = CompositeParams {
            order: 0,
            ..CompositeParams::default()
        };
        let result = composite(&fg, &bg, None, &params).unwrap();
        let layer = result.layer("C").unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(layer.sample(x, y, 0), 1.0);
            }
        }
    }

    #[test]
    fn test_small_foreground_leaves_border() {
        // A 2x2 foreground centered on an 8x8 background covers only the
        // middle; corners keep the background value.
        let fg = solid(1.0, 2);
        let bg = solid(0.25, 8);
        let params = CompositeParams {
            order: 0,
            ..CompositeParams::default()
        };
        let result = composite(&fg, &bg, None, &params).unwrap();
        let layer = result.layer("C").unwrap();
        assert_eq!(layer.sample(0, 0, 0), 0.25);
        assert_eq!(layer.sample(7, 7, 0), 0.25);
        assert_eq!(layer.sample(4, 4, 0), 1.0);
    }

    #[test]
    fn test_mask_image_blends() {
        let fg = solid(1.0, 4);
        let bg = solid(0.0, 4);
        let mask =
            Image::new().with_layer("A", Layer::filled(4, 4, &[0.5], Role::Alpha).unwrap());
        let params = CompositeParams {
            order: 0,
            ..CompositeParams::default()
        };
        let result = composite(&fg, &bg, Some(&mask), &params).unwrap();
        assert_relative_eq!(result.layer("C").unwrap().sample(2, 2, 0), 0.5);
    }

    #[test]
    fn test_foreground_alpha_used_by_default() {
        let fg_layer = Layer::filled(4, 4, &[1.0], Role::None).unwrap();
        let alpha = Layer::filled(4, 4, &[0.25], Role::Alpha).unwrap();
        let fg = Image::new().with_layer("C", fg_layer).with_layer("A", alpha);
        let bg = solid(0.0, 4);
        let params = CompositeParams {
            order: 0,
            ..CompositeParams::default()
        };
        let result = composite(&fg, &bg, None, &params).unwrap();
        assert_relative_eq!(result.layer("C").unwrap().sample(1, 1, 0), 0.25);
    }

    #[test]
    fn test_output_layer_name() {
        let fg = solid(1.0, 4);
        let bg = solid(0.0, 4);
        let params = CompositeParams {
            layer: Some("comp".into()),
            order: 0,
            ..CompositeParams::default()
        };
        let result = composite(&fg, &bg, None, &params).unwrap();
        assert_eq!(result.layer_names(), vec!["comp"]);
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let fg = Image::new()
            .with_layer("C", Layer::filled(4, 4, &[1.0, 0.0, 0.0], Role::Rgb).unwrap());
        let bg = solid(0.0, 4);
        let result = composite(&fg, &bg, None, &CompositeParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_mask_resolution_mismatch_rejected() {
        let fg = solid(1.0, 4);
        let bg = solid(0.0, 4);
        let mask =
            Image::new().with_layer("A", Layer::filled(8, 8, &[1.0], Role::Alpha).unwrap());
        let result = composite(&fg, &bg, Some(&mask), &CompositeParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_quarter_turn_of_off_center_pixel() {
        // One bright pixel right of center rotates to above center under a
        // 90 degree counter-clockwise turn.
        let mut data = vec![0.0f32; 9 * 9];
        data[4 * 9 + 6] = 1.0; // row 4 (center), two columns right
        let fg = Image::new()
            .with_layer("C", Layer::new(9, 9, 1, data, Role::None).unwrap());
        let bg = solid(0.0, 9);
        let params = CompositeParams {
            order: 0,
            orientation: 90.0,
            ..CompositeParams::default()
        };
        let result = composite(&fg, &bg, None, &params).unwrap();
        let layer = result.layer("C").unwrap();
        // The pivot sits at (4.5, 4.5), so (6, 4) relative to it is
        // (1.5, -0.5) in row coordinates; a quarter turn lands it at
        // column 4, row 3.
        assert_eq!(layer.sample(4, 3, 0), 1.0);
        assert_eq!(layer.sample(6, 4, 0), 0.0);
    }
}
