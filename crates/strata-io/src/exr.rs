//! OpenEXR format support.
//!
//! EXR is the high-dynamic-range path and the carrier for multi-layer
//! renders and Cryptomatte data. Every EXR channel loads as its own
//! single-channel layer named by the full channel path (`"C.R"`,
//! `"M00.r"`, ...), leaving semantic grouping to downstream operators.
//! Unknown header attributes with representable types round-trip through
//! image metadata, which is how Cryptomatte manifests survive.

use std::path::Path;

use exr::prelude::{
    AnyChannel, AnyChannels, AttributeValue, FlatSamples, ReadChannels, ReadLayers, Text, Vec2, WritableImage,
    read,
};
use smallvec::SmallVec;
use strata_core::{Image, Layer, MetaValue, Metadata, Role};
use tracing::debug;

use crate::error::{IoError, IoResult};

fn attribute_to_meta(value: &AttributeValue) -> Option<MetaValue> {
    match value {
        AttributeValue::Text(text) => Some(MetaValue::Text(text.to_string())),
        AttributeValue::I32(v) => Some(MetaValue::Integer(*v as i64)),
        AttributeValue::F32(v) => Some(MetaValue::Real(*v as f64)),
        AttributeValue::F64(v) => Some(MetaValue::Real(*v)),
        _ => None,
    }
}

fn meta_to_attribute(value: &MetaValue) -> AttributeValue {
    match value {
        MetaValue::Text(text) => {
            AttributeValue::Text(Text::new_or_none(text).unwrap_or_else(|| Text::from("")))
        }
        MetaValue::Integer(v) => AttributeValue::I32(*v as i32),
        MetaValue::Real(v) => AttributeValue::F64(*v),
    }
}

/// Reads an OpenEXR file into a layered image.
///
/// Deep data is rejected; mip levels beyond the largest are ignored.
pub fn load(path: &Path) -> IoResult<Image> {
    let exr_image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .all_layers()
        .all_attributes()
        .from_file(path)
        .map_err(|e| IoError::decode(e.to_string()))?;

    let mut metadata = Metadata::new();
    for (key, value) in &exr_image.attributes.other {
        if let Some(meta) = attribute_to_meta(value) {
            metadata.insert(key.to_string(), meta);
        }
    }

    let mut image = Image::new();
    for exr_layer in &exr_image.layer_data {
        let Vec2(width, height) = exr_layer.size;
        let prefix = exr_layer
            .attributes
            .layer_name
            .as_ref()
            .map(|name| name.to_string());
        for (key, value) in &exr_layer.attributes.other {
            if let Some(meta) = attribute_to_meta(value) {
                metadata.insert(key.to_string(), meta);
            }
        }

        for channel in &exr_layer.channel_data.list {
            let name = match &prefix {
                Some(prefix) => format!("{prefix}.{}", channel.name),
                None => channel.name.to_string(),
            };
            let data: Vec<f32> = channel.sample_data.values_as_f32().collect();
            if data.len() != width * height {
                return Err(IoError::decode(format!(
                    "channel {name:?} holds {} samples for {width}x{height}",
                    data.len()
                )));
            }
            image = image.with_layer(name, Layer::new(width, height, 1, data, Role::None)?);
        }
    }
    debug!(path = %path.display(), layers = image.len(), "exr load");
    Ok(image.with_metadata(metadata))
}

/// Writes a layered image to a single-part OpenEXR file.
///
/// Each layer becomes one channel per component, named
/// `<layer>.<component>` (single-channel layers keep their name verbatim,
/// preserving pre-dotted names like `"M00.r"`). All layers must share one
/// resolution - EXR parts have a single data window. Samples are written
/// as full 32-bit floats; image metadata becomes header attributes.
pub fn save(image: &Image, path: &Path) -> IoResult<()> {
    let mut iter = image.iter();
    let Some((_, first)) = iter.next() else {
        return Err(IoError::encode("cannot write an empty image"));
    };
    let (width, height) = first.res();
    if let Some((name, _)) = iter.find(|(_, layer)| layer.res() != (width, height)) {
        return Err(IoError::encode(format!(
            "layer {name:?} resolution differs; EXR parts need uniform resolution"
        )));
    }

    let mut channels: Vec<AnyChannel<FlatSamples>> = Vec::new();
    for (name, layer) in image.iter() {
        let depth = layer.depth();
        let components = layer.role().components(depth);
        for (c, component) in components.iter().enumerate() {
            let channel_name = if depth == 1 {
                name.clone()
            } else {
                format!("{name}.{component}")
            };
            let text = Text::new_or_none(&channel_name).ok_or_else(|| {
                IoError::encode(format!("channel name {channel_name:?} not representable"))
            })?;
            let samples: Vec<f32> = layer
                .data()
                .iter()
                .skip(c)
                .step_by(depth)
                .copied()
                .collect();
            channels.push(AnyChannel::new(text, FlatSamples::F32(samples)));
        }
    }
    debug!(path = %path.display(), channels = channels.len(), "exr save");

    let channels = AnyChannels::sort(SmallVec::from_vec(channels));
    let mut exr_image = exr::prelude::Image::from_channels(Vec2(width, height), channels);
    for (key, value) in image.metadata() {
        let Some(key) = Text::new_or_none(key) else {
            continue;
        };
        exr_image
            .attributes
            .other
            .insert(key, meta_to_attribute(value));
    }
    exr_image
        .write()
        .to_file(path)
        .map_err(|e| IoError::encode(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rgb_roundtrip_splits_channels() {
        let layer = Layer::filled(8, 4, &[0.5, 0.25, 4.0], Role::Rgb).unwrap();
        let image = Image::new().with_layer("C", layer);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.exr");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.layer_names(), vec!["C.B", "C.G", "C.R"]);
        let red = loaded.layer("C.R").unwrap();
        assert_eq!(red.shape(), (8, 4, 1));
        assert_eq!(red.role(), Role::None);
        assert_relative_eq!(red.sample(0, 0, 0), 0.5);
        // HDR values survive.
        assert_relative_eq!(loaded.layer("C.B").unwrap().sample(3, 2, 0), 4.0);
    }

    #[test]
    fn test_single_channel_name_kept_verbatim() {
        let ids = Layer::filled(4, 4, &[1.5], Role::None).unwrap();
        let image = Image::new().with_layer("M00.r", ids);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranks.exr");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert!(loaded.layer("M00.r").is_ok());
    }

    #[test]
    fn test_metadata_roundtrip() {
        let mut metadata = Metadata::new();
        metadata.insert(
            "cryptomatte/a3b44c9/name".to_string(),
            MetaValue::from("M"),
        );
        metadata.insert("frame".to_string(), MetaValue::Integer(42));
        let layer = Layer::filled(2, 2, &[1.0], Role::Matte).unwrap();
        let image = Image::new().with_layer("M", layer).with_metadata(metadata);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.exr");

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(
            loaded.metadata().get("cryptomatte/a3b44c9/name"),
            Some(&MetaValue::Text("M".to_string()))
        );
        assert_eq!(
            loaded.metadata().get("frame"),
            Some(&MetaValue::Integer(42))
        );
    }

    #[test]
    fn test_mixed_resolution_rejected() {
        let a = Layer::filled(4, 4, &[1.0], Role::Matte).unwrap();
        let b = Layer::filled(8, 8, &[1.0], Role::Matte).unwrap();
        let image = Image::new().with_layer("A", a).with_layer("B", b);
        let dir = tempfile::tempdir().unwrap();
        assert!(save(&image, &dir.path().join("bad.exr")).is_err());
    }

    #[test]
    fn test_empty_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save(&Image::new(), &dir.path().join("empty.exr")).is_err());
    }
}
