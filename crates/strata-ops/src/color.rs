//! Channel arithmetic: dot products, grayscale conversion, colormapping.

use strata_core::{Image, Layer, Role};
use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::palette::Palette;

/// Rec. 709 luma weights used by [`rgb2gray`].
pub const GRAY_WEIGHTS: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Replaces matching layers with per-pixel linear combinations of their
/// channels.
///
/// `weights` is a matrix, one row per output channel; every row's length
/// must equal the source layer's channel count or the operator fails with
/// a shape mismatch. `role` tags the rebuilt layers and must agree with
/// the row count. Layers not matching `layers` pass through untouched.
pub fn dot(image: &Image, layers: &str, weights: &[Vec<f32>], role: Role) -> OpsResult<Image> {
    if weights.is_empty() {
        return Err(OpsError::invalid_parameter("weight matrix must not be empty"));
    }
    let out_depth = weights.len();
    let selected = image.match_layer_names(layers)?;
    let mut result = image.clone();
    for name in selected {
        let layer = image.layer(&name)?;
        let (width, height, depth) = layer.shape();
        for row in weights {
            if row.len() != depth {
                return Err(OpsError::shape_mismatch(format!(
                    "weight row has {} entries, layer {:?} has {} channels",
                    row.len(),
                    name,
                    depth
                )));
            }
        }
        debug!(layer = name.as_str(), depth, out_depth, "dot");

        let src = layer.data();
        let mut data = vec![0.0f32; width * height * out_depth];
        for px in 0..width * height {
            let src_idx = px * depth;
            let dst_idx = px * out_depth;
            for (o, row) in weights.iter().enumerate() {
                let mut sum = 0.0f32;
                for (c, w) in row.iter().enumerate() {
                    sum += src[src_idx + c] * w;
                }
                data[dst_idx + o] = sum;
            }
        }
        let mapped = Layer::new(width, height, out_depth, data, role)?
            .with_metadata(layer.metadata().clone());
        result = result.with_layer(name, mapped);
    }
    Ok(result)
}

/// Converts matching RGB layers to single-channel luminance using Rec. 709
/// weights.
pub fn rgb2gray(image: &Image, layers: &str) -> OpsResult<Image> {
    dot(image, layers, &[GRAY_WEIGHTS.to_vec()], Role::Luminance)
}

/// Maps a scalar layer through a color palette, producing an RGB image.
///
/// When `layer` is `None` the first luminance-role layer is used. Samples
/// are normalized to `[0, 1]` against `range`, or against the layer's own
/// min/max when no range is given, then looked up in `palette` by
/// piecewise-linear interpolation. The result holds the mapped layer only.
pub fn colormap(
    image: &Image,
    layer: Option<&str>,
    palette: &Palette,
    range: Option<(f32, f32)>,
) -> OpsResult<Image> {
    let name = match layer {
        Some(name) => name.to_string(),
        None => image
            .first_with_role(Role::Luminance)
            .ok_or_else(|| {
                OpsError::invalid_parameter("no layer given and no luminance layer present")
            })?
            .to_string(),
    };
    let source = image.layer(&name)?;
    let (width, height, depth) = source.shape();
    if depth != 1 {
        return Err(OpsError::shape_mismatch(format!(
            "colormap input {name:?} must have one channel, has {depth}"
        )));
    }

    let (lo, hi) = range.unwrap_or_else(|| source.bounds());
    debug!(layer = name.as_str(), lo, hi, stops = palette.len(), "colormap");

    let data = palette.linear_map(source.data(), (lo, hi));
    let mapped = Layer::new(width, height, 3, data, Role::Rgb)?;
    Ok(Image::new().with_layer(name, mapped))
}
