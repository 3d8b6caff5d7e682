//! Layer-set operators: merge, delete, rename, remap.
//!
//! These rearrange whole layers and channels without computing new sample
//! values.

use std::collections::BTreeMap;

use strata_core::{Image, Layer, Role};
use tracing::debug;

use crate::error::{OpsError, OpsResult};

/// Merges the layers of several images into one image.
///
/// Layers are copied in the order the images are given; when two images
/// carry the same layer name the later image wins. Layers are not resized
/// or blended - merging is purely a union of layer sets, so differing
/// resolutions and channel counts coexist in the result. Image-level
/// metadata merges the same way, later images overriding earlier keys.
pub fn merge(images: &[&Image]) -> Image {
    let mut layers = BTreeMap::new();
    let mut metadata = strata_core::Metadata::new();
    for image in images {
        for (name, layer) in image.iter() {
            layers.insert(name.clone(), layer.clone());
        }
        for (key, value) in image.metadata() {
            metadata.insert(key.clone(), value.clone());
        }
    }
    debug!(images = images.len(), layers = layers.len(), "merge");
    Image::from_layers(layers).with_metadata(metadata)
}

/// Removes every layer matching a whitespace-delimited set of glob patterns.
///
/// Patterns that match nothing are a no-op. See
/// [`Image::match_layer_names`] for the pattern syntax.
pub fn delete(image: &Image, layers: &str) -> OpsResult<Image> {
    let result = image.without_layers(layers)?;
    debug!(
        patterns = layers,
        removed = image.len() - result.len(),
        "delete"
    );
    Ok(result)
}

/// Renames layers per an old-name to new-name table.
///
/// Names absent from `changes` pass through unchanged. Renaming onto an
/// existing name overwrites it - last write wins.
pub fn rename(image: &Image, changes: &BTreeMap<String, String>) -> Image {
    debug!(changes = changes.len(), "rename");
    image.renamed(changes)
}

/// One source picked by [`remap`]: a whole layer or a single channel of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every channel of the named layer, in order.
    Layer(String),
    /// One zero-based channel of the named layer.
    Channel(String, usize),
}

/// Rebuilds layers from selected layers and channels of the input.
///
/// Each entry of `mapping` names an output layer, the selections stacked
/// along its channel axis, and the role to tag it with. Selections feeding
/// one output must share a resolution. The result holds only the remapped
/// layers; an empty mapping yields an empty image.
pub fn remap(
    image: &Image,
    mapping: &BTreeMap<String, (Vec<Selection>, Role)>,
) -> OpsResult<Image> {
    let mut result = Image::new();
    for (name, (selections, role)) in mapping {
        if selections.is_empty() {
            return Err(OpsError::invalid_parameter(format!(
                "remap output {name:?} selects nothing"
            )));
        }

        let mut sources: Vec<(&Layer, Option<usize>)> = Vec::new();
        let mut res: Option<(usize, usize)> = None;
        for selection in selections {
            let (layer, channel) = match selection {
                Selection::Layer(source) => (image.layer(source)?, None),
                Selection::Channel(source, channel) => {
                    let layer = image.layer(source)?;
                    if *channel >= layer.depth() {
                        return Err(OpsError::shape_mismatch(format!(
                            "layer {source:?} has {} channels, channel {channel} requested",
                            layer.depth()
                        )));
                    }
                    (layer, Some(*channel))
                }
            };
            match res {
                None => res = Some(layer.res()),
                Some(expected) if layer.res() != expected => {
                    return Err(OpsError::shape_mismatch(format!(
                        "remap output {name:?} mixes resolutions {:?} and {:?}",
                        expected,
                        layer.res()
                    )));
                }
                Some(_) => {}
            }
            sources.push((layer, channel));
        }

        let (width, height) = res.unwrap_or((0, 0));
        let depth: usize = sources
            .iter()
            .map(|(layer, channel)| if channel.is_some() { 1 } else { layer.depth() })
            .sum();
        let mut data = vec![0.0f32; width * height * depth];
        let mut offset = 0;
        for (layer, channel) in &sources {
            let src = layer.data();
            let src_depth = layer.depth();
            match channel {
                Some(c) => {
                    for px in 0..width * height {
                        data[px * depth + offset] = src[px * src_depth + c];
                    }
                    offset += 1;
                }
                None => {
                    for px in 0..width * height {
                        data[px * depth + offset..px * depth + offset + src_depth]
                            .copy_from_slice(&src[px * src_depth..(px + 1) * src_depth]);
                    }
                    offset += src_depth;
                }
            }
        }
        result = result.with_layer(name, Layer::new(width, height, depth, data, *role)?);
    }
    debug!(outputs = mapping.len(), "remap");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Layer, Role};

    fn matte(value: f32) -> Layer {
        Layer::filled(4, 4, &[value], Role::Matte).unwrap()
    }

    #[test]
    fn test_merge_union() {
        let a = Image::new().with_layer("A", matte(0.1));
        let b = Image::new().with_layer("B", matte(0.2));
        let merged = merge(&[&a, &b]);
        assert_eq!(merged.layer_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_merge_later_wins() {
        let a = Image::new().with_layer("A", matte(0.1));
        let b = Image::new().with_layer("A", matte(0.9));
        let merged = merge(&[&a, &b]);
        assert_eq!(merged.layer("A").unwrap().sample(0, 0, 0), 0.9);
    }

    #[test]
    fn test_merge_mixed_resolutions() {
        let a = Image::new().with_layer("A", matte(0.1));
        let big = Layer::filled(16, 16, &[0.5], Role::Matte).unwrap();
        let b = Image::new().with_layer("B", big);
        let merged = merge(&[&a, &b]);
        assert_eq!(merged.layer("A").unwrap().res(), (4, 4));
        assert_eq!(merged.layer("B").unwrap().res(), (16, 16));
    }

    #[test]
    fn test_delete_patterns() {
        let image = Image::new()
            .with_layer("C", matte(0.0))
            .with_layer("C2", matte(0.0))
            .with_layer("depth", matte(0.0));
        let result = delete(&image, "C*").unwrap();
        assert_eq!(result.layer_names(), vec!["depth"]);
    }

    #[test]
    fn test_rename() {
        let image = Image::new().with_layer("C", matte(0.3));
        let changes = BTreeMap::from([("C".to_string(), "beauty".to_string())]);
        let result = rename(&image, &changes);
        assert_eq!(result.layer_names(), vec!["beauty"]);
    }

    fn rgb_card() -> Image {
        let color = Layer::filled(4, 4, &[0.1, 0.2, 0.3], Role::Rgb).unwrap();
        Image::new()
            .with_layer("C", color)
            .with_layer("A", matte(0.5))
    }

    #[test]
    fn test_remap_splits_channel() {
        let mapping = BTreeMap::from([(
            "green".to_string(),
            (vec![Selection::Channel("C".into(), 1)], Role::Luminance),
        )]);
        let result = remap(&rgb_card(), &mapping).unwrap();
        assert_eq!(result.layer_names(), vec!["green"]);
        let layer = result.layer("green").unwrap();
        assert_eq!(layer.shape(), (4, 4, 1));
        assert_eq!(layer.role(), Role::Luminance);
        assert_eq!(layer.sample(2, 2, 0), 0.2);
    }

    #[test]
    fn test_remap_stacks_layers() {
        // RGB plus the matte becomes one four-channel layer, matte last.
        let mapping = BTreeMap::from([(
            "rgba".to_string(),
            (
                vec![Selection::Layer("C".into()), Selection::Layer("A".into())],
                Role::None,
            ),
        )]);
        let result = remap(&rgb_card(), &mapping).unwrap();
        let layer = result.layer("rgba").unwrap();
        assert_eq!(layer.depth(), 4);
        assert_eq!(layer.sample(0, 0, 0), 0.1);
        assert_eq!(layer.sample(0, 0, 3), 0.5);
    }

    #[test]
    fn test_remap_reorders_channels() {
        let mapping = BTreeMap::from([(
            "bgr".to_string(),
            (
                vec![
                    Selection::Channel("C".into(), 2),
                    Selection::Channel("C".into(), 1),
                    Selection::Channel("C".into(), 0),
                ],
                Role::Rgb,
            ),
        )]);
        let result = remap(&rgb_card(), &mapping).unwrap();
        let layer = result.layer("bgr").unwrap();
        assert_eq!(layer.sample(1, 1, 0), 0.3);
        assert_eq!(layer.sample(1, 1, 2), 0.1);
    }

    #[test]
    fn test_remap_empty_mapping_is_empty_image() {
        assert!(remap(&rgb_card(), &BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_remap_missing_layer() {
        let mapping = BTreeMap::from([(
            "out".to_string(),
            (vec![Selection::Layer("Z".into())], Role::None),
        )]);
        assert!(remap(&rgb_card(), &mapping).is_err());
    }

    #[test]
    fn test_remap_rejects_bad_channel() {
        let mapping = BTreeMap::from([(
            "out".to_string(),
            (vec![Selection::Channel("C".into(), 7)], Role::None),
        )]);
        assert!(matches!(
            remap(&rgb_card(), &mapping),
            Err(OpsError::Core(strata_core::Error::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_remap_rejects_mixed_resolutions() {
        let image = rgb_card().with_layer("big", Layer::filled(8, 8, &[1.0], Role::None).unwrap());
        let mapping = BTreeMap::from([(
            "out".to_string(),
            (
                vec![Selection::Layer("A".into()), Selection::Layer("big".into())],
                Role::None,
            ),
        )]);
        assert!(remap(&image, &mapping).is_err());
    }
}
