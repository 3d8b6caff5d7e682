//! sRGB transfer functions.
//!
//! Layer samples are nominally linear brightness; 8-bit codecs store
//! gamma-encoded sRGB. These are the only transfer functions the toolkit
//! owns - wider color management is out of scope.

/// Converts one sRGB-encoded value to linear brightness.
#[inline]
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts one linear-brightness value to sRGB encoding.
#[inline]
pub fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts a slice of sRGB-encoded values to linear brightness.
pub fn srgb_to_linear_slice(values: &[f32]) -> Vec<f32> {
    values.iter().copied().map(srgb_to_linear).collect()
}

/// Converts a slice of linear-brightness values to sRGB encoding.
pub fn linear_to_srgb_slice(values: &[f32]) -> Vec<f32> {
    values.iter().copied().map(linear_to_srgb).collect()
}
