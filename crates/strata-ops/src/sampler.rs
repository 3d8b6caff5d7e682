//! Resampling kernels shared by [`crate::transform`] and [`crate::composite`].
//!
//! Interpolation is requested by spline order, matching the common
//! image-processing convention: 0 is nearest-neighbor, 1 is bilinear, 3 is
//! cubic. Other orders are rejected rather than approximated.

use crate::error::{OpsError, OpsResult};

/// Reconstruction filter used when resampling layer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Nearest-neighbor (order 0). Blocky but exact.
    Nearest,
    /// Bilinear (order 1). Smooth, slightly soft.
    Bilinear,
    /// Cubic, Mitchell-Netravali flavored (order 3).
    #[default]
    Bicubic,
}

impl Filter {
    /// Maps a spline order to a filter.
    ///
    /// Only orders 0, 1, and 3 are supported; anything else fails with
    /// [`OpsError::UnsupportedInterpolation`].
    pub fn from_order(order: i64) -> OpsResult<Self> {
        match order {
            0 => Ok(Filter::Nearest),
            1 => Ok(Filter::Bilinear),
            3 => Ok(Filter::Bicubic),
            other => Err(OpsError::UnsupportedInterpolation(other)),
        }
    }

    /// Support radius of the kernel, in source pixels.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Bicubic => 2.0,
        }
    }

    /// Evaluates the kernel at distance `x` from the sample center.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest => {
                if x.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Filter::Bilinear => {
                let ax = x.abs();
                if ax < 1.0 { 1.0 - ax } else { 0.0 }
            }
            Filter::Bicubic => mitchell(x),
        }
    }
}

/// Mitchell-Netravali cubic with B = C = 1/3.
#[inline]
fn mitchell(x: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;
    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

/// Axis selector for the separable resize passes.
#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Resamples channel-interleaved samples to a new resolution.
///
/// Separable implementation: one pass along x, one along y. When
/// downscaling, the kernel support widens with the scale factor so the
/// result is properly band-limited.
pub fn resize_samples(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    dst_h: usize,
    filter: Filter,
) -> OpsResult<Vec<f32>> {
    if src.len() != src_w * src_h * channels {
        return Err(OpsError::shape_mismatch(format!(
            "expected {} samples, got {}",
            src_w * src_h * channels,
            src.len()
        )));
    }
    if src_w == 0 || src_h == 0 {
        return Err(OpsError::invalid_parameter(
            "cannot resample a zero-resolution source",
        ));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::invalid_parameter(
            "target resolution must be positive",
        ));
    }
    let temp = resample_axis(src, src_w, src_h, channels, dst_w, filter, Axis::X);
    Ok(resample_axis(&temp, src_h, dst_w, channels, dst_h, filter, Axis::Y))
}

/// One separable pass: resamples `axis_len` source positions along one axis
/// to `new_len` destination positions, for every position on the other axis.
fn resample_axis(
    src: &[f32],
    axis_len: usize,
    cross_len: usize,
    channels: usize,
    new_len: usize,
    filter: Filter,
    axis: Axis,
) -> Vec<f32> {
    let mut dst = vec![0.0f32; new_len * cross_len * channels];
    let scale = axis_len as f32 / new_len as f32;
    let width = scale.max(1.0);
    let support = filter.support() * width;

    let src_index = |along: usize, cross: usize| match axis {
        Axis::X => (cross * axis_len + along) * channels,
        Axis::Y => (along * cross_len + cross) * channels,
    };
    let dst_index = |along: usize, cross: usize| match axis {
        Axis::X => (cross * new_len + along) * channels,
        Axis::Y => (along * cross_len + cross) * channels,
    };

    let mut sum = vec![0.0f32; channels];
    for cross in 0..cross_len {
        for along in 0..new_len {
            let center = (along as f32 + 0.5) * scale - 0.5;
            let lo = ((center - support).floor() as isize).max(0) as usize;
            let hi = ((center + support).ceil() as usize).min(axis_len - 1);

            sum.fill(0.0);
            let mut weight_sum = 0.0f32;
            for tap in lo..=hi {
                let w = filter.weight((tap as f32 - center) / width);
                weight_sum += w;
                let idx = src_index(tap, cross);
                for c in 0..channels {
                    sum[c] += src[idx + c] * w;
                }
            }

            if weight_sum > 0.0 {
                let idx = dst_index(along, cross);
                for c in 0..channels {
                    dst[idx + c] = sum[c] / weight_sum;
                }
            }
        }
    }

    dst
}

/// Samples channel-interleaved data at a fractional position.
///
/// Taps falling outside the source extent contribute zero but still count
/// toward normalization, so sampling near an edge fades toward zero instead
/// of smearing border pixels. Used by the inverse-mapped warp in
/// [`crate::composite`].
pub fn sample_at(
    src: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    x: f32,
    y: f32,
    filter: Filter,
    out: &mut [f32],
) {
    out.fill(0.0);
    if width == 0 || height == 0 {
        return;
    }

    if let Filter::Nearest = filter {
        let sx = x.round();
        let sy = y.round();
        if sx < 0.0 || sy < 0.0 || sx >= width as f32 || sy >= height as f32 {
            return;
        }
        let idx = (sy as usize * width + sx as usize) * channels;
        out.copy_from_slice(&src[idx..idx + channels]);
        return;
    }

    let support = filter.support();
    let x_lo = (x - support).floor() as isize;
    let x_hi = (x + support).ceil() as isize;
    let y_lo = (y - support).floor() as isize;
    let y_hi = (y + support).ceil() as isize;

    let mut weight_sum = 0.0f32;
    for ty in y_lo..=y_hi {
        let wy = filter.weight(ty as f32 - y);
        if wy == 0.0 {
            continue;
        }
        for tx in x_lo..=x_hi {
            let w = wy * filter.weight(tx as f32 - x);
            weight_sum += w;
            if tx < 0 || ty < 0 || tx >= width as isize || ty >= height as isize {
                continue;
            }
            let idx = (ty as usize * width + tx as usize) * channels;
            for c in 0..channels {
                out[c] += src[idx + c] * w;
            }
        }
    }

    if weight_sum > 0.0 {
        for v in out.iter_mut() {
            *v /= weight_sum;
        }
    }
}
