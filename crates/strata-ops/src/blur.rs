//! Gaussian blur.

use strata_core::Image;
use strata_units::Couple;
use tracing::debug;

use crate::error::{OpsError, OpsResult};

/// Blurs matching layers with a separable Gaussian.
///
/// `radius` gives the standard deviation per axis as dimension expressions,
/// so `"0.01w"` blurs proportionally to each layer's own width. Layers not
/// matching `layers` pass through untouched. A zero radius on an axis
/// leaves that axis unfiltered; a negative radius is rejected.
///
/// Edges are handled by clamping: samples beyond the border repeat the
/// border pixel, so a constant layer stays constant.
pub fn gaussian(image: &Image, layers: &str, radius: &Couple) -> OpsResult<Image> {
    let selected = image.match_layer_names(layers)?;
    let mut result = image.clone();
    for name in selected {
        let layer = image.layer(&name)?;
        let (width, height, depth) = layer.shape();
        let (sigma_x, sigma_y) = radius.resolve(width as f64, height as f64);
        if sigma_x < 0.0 || sigma_y < 0.0 {
            return Err(OpsError::invalid_parameter(format!(
                "blur radius must be >= 0, got ({sigma_x}, {sigma_y})"
            )));
        }
        debug!(layer = name.as_str(), sigma_x, sigma_y, "gaussian");

        let mut data = layer.data().to_vec();
        if sigma_x > 0.0 {
            let kernel = gaussian_kernel(sigma_x as f32);
            data = convolve_axis(&data, width, height, depth, &kernel, true);
        }
        if sigma_y > 0.0 {
            let kernel = gaussian_kernel(sigma_y as f32);
            data = convolve_axis(&data, width, height, depth, &kernel, false);
        }
        result = result.with_layer(name, layer.with_data(data)?);
    }
    Ok(result)
}

/// Builds a normalized 1-D Gaussian kernel truncated at four standard
/// deviations.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let half = (4.0 * sigma).ceil().max(1.0) as i64;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-(i * i) as f32 / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// 1-D convolution along one axis with edge clamping.
fn convolve_axis(
    src: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    horizontal: bool,
) -> Vec<f32> {
    let mut dst = vec![0.0f32; src.len()];
    let half = (kernel.len() / 2) as isize;
    let limit = if horizontal { width } else { height } as isize;

    for y in 0..height {
        for x in 0..width {
            let dst_idx = (y * width + x) * channels;
            for (k, &w) in kernel.iter().enumerate() {
                let offset = k as isize - half;
                let (sx, sy) = if horizontal {
                    ((x as isize + offset).clamp(0, limit - 1) as usize, y)
                } else {
                    (x, (y as isize + offset).clamp(0, limit - 1) as usize)
                };
                let src_idx = (sy * width + sx) * channels;
                for c in 0..channels {
                    dst[dst_idx + c] += src[src_idx + c] * w;
                }
            }
        }
    }

    dst
}
