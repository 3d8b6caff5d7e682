//! File codecs for strata layered images.
//!
//! Three formats are supported, picked by file extension:
//!
//! - `exr` - OpenEXR, the HDR and multi-layer interchange path
//! - `png` - 8-bit sRGB interchange
//! - `sti` - native dump, full-fidelity caching
//!
//! [`load`] and [`save`] dispatch on the (case-insensitive) extension;
//! the per-format modules are public for callers that want to bypass
//! the dispatch.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let image = strata_io::load(Path::new("render.exr"))?;
//! strata_io::save(&image, Path::new("preview.png"))?;
//! # Ok::<(), strata_io::IoError>(())
//! ```

#![warn(missing_docs)]

use std::path::Path;

use strata_core::Image;

pub mod error;
pub mod exr;
pub mod native;
pub mod png;

pub use error::{IoError, IoResult};

fn extension(path: &Path) -> IoResult<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| IoError::UnsupportedFormat(path.display().to_string()))
}

/// Reads an image file, choosing the codec from the file extension.
pub fn load(path: &Path) -> IoResult<Image> {
    match extension(path)?.as_str() {
        "exr" => exr::load(path),
        "png" => png::load(path),
        "sti" => native::load(path),
        ext => Err(IoError::UnsupportedFormat(ext.to_string())),
    }
}

/// Writes an image file, choosing the codec from the file extension.
pub fn save(image: &Image, path: &Path) -> IoResult<()> {
    match extension(path)?.as_str() {
        "exr" => exr::save(image, path),
        "png" => png::save(image, path),
        "sti" => native::save(image, path),
        ext => Err(IoError::UnsupportedFormat(ext.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Layer, Role};

    #[test]
    fn test_extension_is_case_insensitive() {
        let layer = Layer::filled(4, 4, &[0.5, 0.5, 0.5], Role::Rgb).unwrap();
        let image = Image::new().with_layer("C", layer);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CARD.PNG");

        save(&image, &path).unwrap();
        assert!(load(&path).unwrap().layer("C").is_ok());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.tiff");
        assert!(matches!(
            load(&path),
            Err(IoError::UnsupportedFormat(ext)) if ext == "tiff"
        ));
        assert!(matches!(
            save(&Image::new(), &path),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("noext")),
            Err(IoError::UnsupportedFormat(_))
        ));
    }
}
