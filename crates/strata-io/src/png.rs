//! PNG format support.
//!
//! PNG is the 8-bit interchange path: color channels are converted between
//! the layer model's linear floats and sRGB-encoded bytes on the way
//! through. Alpha stays linear. 16-bit files load with the same transfer
//! handling at higher precision; writing is always 8-bit.
//!
//! Layer mapping:
//!
//! - grayscale loads as layer `"Y"` (luminance role)
//! - RGB loads as layer `"C"`
//! - an alpha channel loads as layer `"A"`
//!
//! Saving expects the same shapes back: a `"C"` layer with optional `"A"`,
//! or a lone single-channel layer written as grayscale.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use strata_core::color::{linear_to_srgb, srgb_to_linear};
use strata_core::{Image, Layer, Role};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Reads a PNG file into a layered image.
pub fn load(path: &Path) -> IoResult<Image> {
    let file = File::open(path)?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::decode(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::decode("cannot determine output buffer size"))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::decode(e.to_string()))?;
    let buf = &buf[..info.buffer_size()];

    let (width, height) = (info.width as usize, info.height as usize);
    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(IoError::decode(format!(
                "unsupported PNG color type {other:?}"
            )));
        }
    };

    // Normalize samples to [0, 1] floats, still sRGB-encoded.
    let encoded: Vec<f32> = match info.bit_depth {
        png::BitDepth::Eight => buf.iter().map(|&v| v as f32 / 255.0).collect(),
        png::BitDepth::Sixteen => buf
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]) as f32 / 65535.0)
            .collect(),
        other => {
            return Err(IoError::decode(format!(
                "unsupported PNG bit depth {other:?}"
            )));
        }
    };
    if encoded.len() != width * height * channels {
        return Err(IoError::decode("PNG frame shorter than expected"));
    }
    debug!(path = %path.display(), width, height, channels, "png load");

    let color_channels = channels - (channels % 2 == 0) as usize;
    let pixels = width * height;
    let mut color = Vec::with_capacity(pixels * color_channels);
    let mut alpha = Vec::with_capacity(if channels % 2 == 0 { pixels } else { 0 });
    for px in encoded.chunks_exact(channels) {
        for &v in &px[..color_channels] {
            color.push(srgb_to_linear(v));
        }
        if channels % 2 == 0 {
            alpha.push(px[color_channels]);
        }
    }

    let mut image = Image::new();
    if color_channels == 1 {
        image = image.with_layer("Y", Layer::new(width, height, 1, color, Role::Luminance)?);
    } else {
        image = image.with_layer("C", Layer::new(width, height, 3, color, Role::Rgb)?);
    }
    if !alpha.is_empty() {
        image = image.with_layer("A", Layer::new(width, height, 1, alpha, Role::Alpha)?);
    }
    Ok(image)
}

/// Writes a layered image to an 8-bit PNG file.
///
/// Accepts a `"C"` color layer (3 channels, written sRGB-encoded) with an
/// optional single-channel `"A"` alpha layer of the same resolution. With
/// no `"C"`, the gray source is `"Y"` when present, otherwise exactly one
/// single-channel layer besides `"A"`; `"A"` again rides along as alpha,
/// so anything [`load`] produces writes back out. Anything else cannot be
/// represented and fails with [`IoError::Encode`].
pub fn save(image: &Image, path: &Path) -> IoResult<()> {
    let (layer, alpha) = match image.get("C") {
        Some(color) => {
            if color.depth() != 3 {
                return Err(IoError::encode(format!(
                    "PNG color layer \"C\" must have 3 channels, has {}",
                    color.depth()
                )));
            }
            let alpha = match image.get("A") {
                Some(a) if a.depth() == 1 && a.res() == color.res() => Some(a),
                Some(_) => {
                    return Err(IoError::encode(
                        "PNG alpha layer \"A\" must be single-channel at the color resolution",
                    ));
                }
                None => None,
            };
            (color, alpha)
        }
        None => {
            let alpha = image.get("A").filter(|a| a.depth() == 1);
            let gray = match image.get("Y").filter(|y| y.depth() == 1) {
                Some(y) => Some(y),
                None => {
                    let mut candidates = image
                        .iter()
                        .filter(|(name, layer)| layer.depth() == 1 && name.as_str() != "A");
                    let first = candidates.next().map(|(_, layer)| layer);
                    if candidates.next().is_some() {
                        return Err(IoError::encode(
                            "ambiguous PNG source: several single-channel layers and no \"C\"",
                        ));
                    }
                    first
                }
            };
            match (gray, alpha) {
                (Some(gray), Some(a)) => {
                    if a.res() != gray.res() {
                        return Err(IoError::encode(
                            "PNG alpha layer \"A\" must match the gray layer resolution",
                        ));
                    }
                    (gray, Some(a))
                }
                (Some(gray), None) => (gray, None),
                // A lone matte/alpha layer writes as plain grayscale.
                (None, Some(a)) => (a, None),
                (None, None) => {
                    return Err(IoError::encode(
                        "PNG needs a \"C\" layer or one single-channel layer",
                    ));
                }
            }
        }
    };

    let (width, height, depth) = layer.shape();
    let channels = depth + alpha.is_some() as usize;
    let color_type = match channels {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(IoError::encode(format!("unsupported channel count {n}"))),
    };
    debug!(path = %path.display(), width, height, channels, "png save");

    let mut data = Vec::with_capacity(width * height * channels);
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    for px in 0..width * height {
        for c in 0..depth {
            data.push(to_byte(linear_to_srgb(layer.data()[px * depth + c])));
        }
        if let Some(a) = alpha {
            data.push(to_byte(a.data()[px]));
        }
    }

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);
    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::encode(e.to_string()))?;
    writer
        .write_image_data(&data)
        .map_err(|e| IoError::encode(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rgb_roundtrip() {
        let layer = Layer::filled(16, 8, &[0.5, 0.25, 0.0], Role::Rgb).unwrap();
        let image = Image::new().with_layer("C", layer);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        let layer = loaded.layer("C").unwrap();
        assert_eq!(layer.shape(), (16, 8, 3));
        assert_eq!(layer.role(), Role::Rgb);
        // 8-bit sRGB quantization keeps values within half a code.
        assert_relative_eq!(layer.sample(0, 0, 0), 0.5, epsilon = 3e-3);
        assert_relative_eq!(layer.sample(0, 0, 1), 0.25, epsilon = 3e-3);
        assert_relative_eq!(layer.sample(0, 0, 2), 0.0, epsilon = 3e-3);
    }

    #[test]
    fn test_rgba_roundtrip() {
        let color = Layer::filled(4, 4, &[1.0, 0.0, 0.0], Role::Rgb).unwrap();
        let alpha = Layer::filled(4, 4, &[0.5], Role::Alpha).unwrap();
        let image = Image::new().with_layer("C", color).with_layer("A", alpha);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.layer_names(), vec!["A", "C"]);
        // Alpha carries no transfer curve.
        assert_relative_eq!(
            loaded.layer("A").unwrap().sample(0, 0, 0),
            0.5,
            epsilon = 3e-3
        );
    }

    #[test]
    fn test_grayscale_roundtrip() {
        let matte = Layer::filled(8, 8, &[0.18], Role::Matte).unwrap();
        let image = Image::new().with_layer("M", matte);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matte.png");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        let layer = loaded.layer("Y").unwrap();
        assert_eq!(layer.role(), Role::Luminance);
        assert_relative_eq!(layer.sample(0, 0, 0), 0.18, epsilon = 3e-3);
    }

    #[test]
    fn test_gray_alpha_roundtrip() {
        let gray = Layer::filled(4, 4, &[0.5], Role::Luminance).unwrap();
        let alpha = Layer::filled(4, 4, &[0.25], Role::Alpha).unwrap();
        let image = Image::new().with_layer("Y", gray).with_layer("A", alpha);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ya.png");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.layer_names(), vec!["A", "Y"]);
        assert_relative_eq!(
            loaded.layer("Y").unwrap().sample(0, 0, 0),
            0.5,
            epsilon = 3e-3
        );
        assert_relative_eq!(
            loaded.layer("A").unwrap().sample(0, 0, 0),
            0.25,
            epsilon = 3e-3
        );
        // The loaded image is itself representable again.
        save(&loaded, &path).unwrap();
    }

    #[test]
    fn test_unrepresentable_image_rejected() {
        let uv = Layer::filled(4, 4, &[0.0, 1.0], Role::Uv).unwrap();
        let image = Image::new().with_layer("UV", uv);
        let dir = tempfile::tempdir().unwrap();
        assert!(save(&image, &dir.path().join("uv.png")).is_err());
    }
}
