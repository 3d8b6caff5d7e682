//! Multi-layer image storage.

use std::collections::BTreeMap;

use glob::Pattern;

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::metadata::Metadata;
use crate::role::Role;

/// A multi-layer image: unique layer names mapped to [`Layer`] data.
///
/// Layers within one image may have differing resolutions and channel
/// counts; operators that need uniform resolution resolve that as part of
/// their own contract. Images are value objects - every "modifying" method
/// returns a new image and leaves the receiver untouched.
///
/// # Example
///
/// ```
/// use strata_core::{Image, Layer, Role};
///
/// let c = Layer::filled(8, 8, &[1.0, 0.0, 0.0], Role::Rgb).unwrap();
/// let image = Image::new().with_layer("C", c);
/// assert_eq!(image.layer_names(), vec!["C"]);
/// assert!(image.layer("A").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    layers: BTreeMap<String, Layer>,
    metadata: Metadata,
}

impl Image {
    /// Creates an empty image with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an image from name/layer pairs.
    pub fn from_layers(layers: impl IntoIterator<Item = (String, Layer)>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
            metadata: Metadata::new(),
        }
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the image holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Looks up a layer by name, failing loudly when it is absent.
    pub fn layer(&self, name: &str) -> Result<&Layer> {
        self.layers.get(name).ok_or_else(|| Error::not_found(name))
    }

    /// Looks up a layer by name, returning `None` when absent.
    ///
    /// Use this only where an operator's contract documents an optional
    /// layer; everything else goes through [`Image::layer`].
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Iterates over `(name, layer)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Layer)> {
        self.layers.iter()
    }

    /// Layer names in name order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.keys().map(String::as_str).collect()
    }

    /// Image-level metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns a copy of this image with the given image-level metadata.
    pub fn with_metadata(&self, metadata: Metadata) -> Self {
        let mut image = self.clone();
        image.metadata = metadata;
        image
    }

    /// Returns a new image with the named layer added or replaced.
    pub fn with_layer(&self, name: impl Into<String>, layer: Layer) -> Self {
        let mut image = self.clone();
        image.layers.insert(name.into(), layer);
        image
    }

    /// Returns a new image with every layer matching `patterns` removed.
    ///
    /// A pattern that matches nothing is a no-op, not an error.
    pub fn without_layers(&self, patterns: &str) -> Result<Self> {
        let remove = self.match_layer_names(patterns)?;
        let layers = self
            .layers
            .iter()
            .filter(|(name, _)| !remove.iter().any(|r| r == *name))
            .map(|(name, layer)| (name.clone(), layer.clone()))
            .collect();
        Ok(Self {
            layers,
            metadata: self.metadata.clone(),
        })
    }

    /// Returns a new image with layers renamed per an old-name to new-name
    /// table.
    ///
    /// Names absent from `mapping` pass through unchanged; an empty mapping
    /// returns an image indistinguishable from the input. Renaming onto an
    /// existing name overwrites it - last write wins, with layers visited
    /// in name order. No automatic disambiguation happens here.
    pub fn renamed(&self, mapping: &BTreeMap<String, String>) -> Self {
        let mut layers = BTreeMap::new();
        for (name, layer) in &self.layers {
            let target = mapping.get(name).unwrap_or(name);
            layers.insert(target.clone(), layer.clone());
        }
        Self {
            layers,
            metadata: self.metadata.clone(),
        }
    }

    /// Returns layer names matching a whitespace-delimited set of glob
    /// patterns.
    ///
    /// Patterns support `*`, `?`, `[seq]`, and `[!seq]`. A name is included
    /// when any pattern matches it. Malformed patterns fail with
    /// [`Error::InvalidParameter`] rather than silently matching nothing.
    pub fn match_layer_names(&self, patterns: &str) -> Result<Vec<String>> {
        let compiled: Vec<Pattern> = patterns
            .split_whitespace()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| Error::invalid_parameter(format!("bad pattern {p:?}: {e}")))
            })
            .collect::<Result<_>>()?;

        Ok(self
            .layers
            .keys()
            .filter(|name| compiled.iter().any(|p| p.matches(name)))
            .cloned()
            .collect())
    }

    /// Returns the name of the first layer carrying `role`, in name order.
    pub fn first_with_role(&self, role: Role) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, layer)| layer.role() == role)
            .map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for Image {
    type Item = (String, Layer);
    type IntoIter = std::collections::btree_map::IntoIter<String, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(name: &str) -> (String, Layer) {
        (
            name.to_string(),
            Layer::filled(4, 4, &[0.1, 0.2, 0.3], Role::Rgb).unwrap(),
        )
    }

    #[test]
    fn test_layer_lookup() {
        let image = Image::from_layers([rgb("C")]);
        assert!(image.layer("C").is_ok());
        let err = image.layer("Z").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_with_layer_leaves_original() {
        let image = Image::from_layers([rgb("C")]);
        let next = image.with_layer("A", Layer::zeros(4, 4, 1, Role::Alpha).unwrap());
        assert_eq!(image.len(), 1);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_without_layers() {
        let image = Image::from_layers([rgb("C"), rgb("A"), rgb("B")]);
        let next = image.without_layers("A").unwrap();
        assert_eq!(next.layer_names(), vec!["B", "C"]);

        // Non-matching pattern is a no-op.
        let same = image.without_layers("missing").unwrap();
        assert_eq!(same.len(), 3);

        // "*" removes everything.
        assert!(image.without_layers("*").unwrap().is_empty());
    }

    #[test]
    fn test_match_layer_names() {
        let image = Image::from_layers([rgb("C"), rgb("C2"), rgb("depth")]);
        assert_eq!(image.match_layer_names("C*").unwrap(), vec!["C", "C2"]);
        assert_eq!(
            image.match_layer_names("depth C").unwrap(),
            vec!["C", "depth"]
        );
        assert_eq!(image.match_layer_names("?").unwrap(), vec!["C"]);
        assert!(image.match_layer_names("[").is_err());
    }

    #[test]
    fn test_renamed() {
        let image = Image::from_layers([rgb("A")]);
        let mapping = BTreeMap::from([("A".to_string(), "B".to_string())]);
        let next = image.renamed(&mapping);
        assert_eq!(next.layer_names(), vec!["B"]);
        assert_eq!(next.layer("B").unwrap(), image.layer("A").unwrap());

        // Identity mapping returns an equal image.
        assert_eq!(image.renamed(&BTreeMap::new()), image);
    }

    #[test]
    fn test_renamed_collision_last_write_wins() {
        let a = Layer::filled(2, 2, &[1.0], Role::Matte).unwrap();
        let b = Layer::filled(2, 2, &[0.5], Role::Matte).unwrap();
        let image = Image::from_layers([("A".to_string(), a.clone()), ("B".to_string(), b)]);
        let mapping = BTreeMap::from([("A".to_string(), "B".to_string())]);
        let next = image.renamed(&mapping);
        // "A" visits before "B"; the untouched "B" overwrites the rename.
        assert_eq!(next.len(), 1);
        assert_ne!(next.layer("B").unwrap(), &a);
    }

    #[test]
    fn test_first_with_role() {
        let y = Layer::zeros(2, 2, 1, Role::Luminance).unwrap();
        let image = Image::from_layers([rgb("C")]).with_layer("Y", y);
        assert_eq!(image.first_with_role(Role::Luminance), Some("Y"));
        assert_eq!(image.first_with_role(Role::Depth), None);
    }
}
