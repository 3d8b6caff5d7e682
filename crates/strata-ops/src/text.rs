//! Text rasterization into coverage layers.

use std::path::Path;
use std::sync::Mutex;

use cosmic_text::fontdb::Source;
use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};
use strata_core::{Image, Layer, Role};
use strata_units::{Couple, Length, Unit};
use tracing::debug;

use crate::error::{OpsError, OpsResult};

// The font system is expensive to build; share one across calls.
lazy_static::lazy_static! {
    static ref FONT_SYSTEM: Mutex<FontSystem> = Mutex::new(FontSystem::new());
    static ref SWASH_CACHE: Mutex<SwashCache> = Mutex::new(SwashCache::new());
}

/// Horizontal anchor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAnchor {
    /// The left edge of the text box lands at the position.
    Left,
    /// The horizontal center lands at the position.
    #[default]
    Center,
    /// The right edge lands at the position.
    Right,
}

/// Vertical anchor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAnchor {
    /// The top edge of the text box lands at the position.
    Top,
    /// The vertical middle lands at the position.
    #[default]
    Middle,
    /// The bottom edge lands at the position.
    Bottom,
}

/// Nine-way anchor controlling which point of the text bounding box is
/// pinned to the position parameter.
///
/// Parses from two-letter codes: horizontal `l`/`c`/`m`/`r` then vertical
/// `t`/`m`/`b`, so `"lt"` is left-top and `"mm"` (the default) is dead
/// center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    /// Horizontal component.
    pub horizontal: HAnchor,
    /// Vertical component.
    pub vertical: VAnchor,
}

impl Anchor {
    /// Creates an anchor from its components.
    pub const fn new(horizontal: HAnchor, vertical: VAnchor) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        let mut chars = s.chars();
        let (Some(h), Some(v), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(OpsError::invalid_parameter(format!(
                "anchor must be two characters, got {s:?}"
            )));
        };
        let horizontal = match h {
            'l' => HAnchor::Left,
            'c' | 'm' => HAnchor::Center,
            'r' => HAnchor::Right,
            _ => {
                return Err(OpsError::invalid_parameter(format!(
                    "unknown horizontal anchor {h:?}"
                )));
            }
        };
        let vertical = match v {
            't' => VAnchor::Top,
            'm' => VAnchor::Middle,
            'b' => VAnchor::Bottom,
            _ => {
                return Err(OpsError::invalid_parameter(format!(
                    "unknown vertical anchor {v:?}"
                )));
            }
        };
        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

/// Parameters for [`text`].
#[derive(Debug, Clone)]
pub struct TextParams {
    /// Output layer name.
    pub layer: String,
    /// Which point of the text box is pinned to `position`.
    pub anchor: Anchor,
    /// Font family name (`"serif"`, `"monospace"`, ...) or a path to a
    /// `.ttf`/`.otf` file.
    pub font: String,
    /// Font size, resolved against the output resolution.
    pub fontsize: Length,
    /// Anchor position, measured from the bottom-left corner.
    pub position: Couple,
    /// Output resolution in pixels.
    pub res: (usize, usize),
    /// The string to rasterize. Empty renders an all-zero layer.
    pub text: String,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            layer: "A".into(),
            anchor: Anchor::default(),
            font: "sans-serif".into(),
            fontsize: Length::new(0.33, Unit::Vh),
            position: Couple::new(Length::new(0.5, Unit::Vw), Length::new(0.5, Unit::Vh)),
            res: (256, 256),
            text: String::new(),
        }
    }
}

/// Rasterizes a string into a new single-channel coverage layer.
///
/// Glyph coverage is written as values in `[0, 1]`; the layer starts at
/// zero everywhere, so the result composites naturally as a mask. A font
/// given as a file path is loaded on demand; a path that does not exist
/// fails with [`OpsError::FontNotFound`]. Family names that match nothing
/// installed fall back to the system sans-serif.
pub fn text(params: &TextParams) -> OpsResult<Image> {
    let (width, height) = params.res;
    let mut data = vec![0.0f32; width * height];

    if params.text.is_empty() {
        let layer = Layer::new(width, height, 1, data, Role::None)?;
        return Ok(Image::new().with_layer(&params.layer, layer));
    }

    let mut font_system = FONT_SYSTEM
        .lock()
        .map_err(|_| OpsError::invalid_parameter("font system poisoned"))?;
    let mut swash_cache = SWASH_CACHE
        .lock()
        .map_err(|_| OpsError::invalid_parameter("font system poisoned"))?;

    let is_path = params.font.contains('/') || params.font.contains('\\');
    let loaded_family = if is_path {
        let path = Path::new(&params.font);
        if !path.exists() {
            return Err(OpsError::font_not_found(&params.font));
        }
        font_system
            .db_mut()
            .load_font_file(path)
            .map_err(|_| OpsError::font_not_found(&params.font))?;
        // Select the face by the family name it declares; the path itself
        // never matches in the font database.
        let family = font_system
            .db()
            .faces()
            .find(|face| matches!(&face.source, Source::File(p) if p.as_path() == path))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| OpsError::font_not_found(&params.font))?;
        Some(family)
    } else {
        None
    };
    let family = match &loaded_family {
        Some(name) => Family::Name(name),
        None => match params.font.to_lowercase().as_str() {
            "serif" => Family::Serif,
            "monospace" | "mono" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::SansSerif,
        },
    };

    let size = params.fontsize.resolve(width as f64, height as f64) as f32;
    let line_height = size * 1.2;
    let metrics = Metrics::new(size, line_height);
    let mut buffer = Buffer::new(&mut font_system, metrics);
    buffer.set_size(&mut font_system, None, None);
    let attrs = Attrs::new().family(family);
    buffer.set_text(&mut font_system, &params.text, &attrs, Shaping::Advanced);
    buffer.shape_until_scroll(&mut font_system, false);

    // Text box extents from the laid-out runs.
    let mut text_w = 0.0f32;
    let mut lines = 0u32;
    for run in buffer.layout_runs() {
        text_w = text_w.max(run.line_w);
        lines = lines.max(run.line_i as u32 + 1);
    }
    let text_h = lines as f32 * line_height;

    let (pos_x, pos_y) = params.position.resolve(width as f64, height as f64);
    // The vertical axis points up; rows grow down.
    let origin_y = height as f32 - pos_y as f32;
    let box_x = match params.anchor.horizontal {
        HAnchor::Left => pos_x as f32,
        HAnchor::Center => pos_x as f32 - text_w / 2.0,
        HAnchor::Right => pos_x as f32 - text_w,
    };
    let box_y = match params.anchor.vertical {
        VAnchor::Top => origin_y,
        VAnchor::Middle => origin_y - text_h / 2.0,
        VAnchor::Bottom => origin_y - text_h,
    };
    debug!(
        text = params.text.as_str(),
        size, box_x, box_y, "text"
    );

    buffer.draw(
        &mut font_system,
        &mut swash_cache,
        Color::rgba(255, 255, 255, 255),
        |x, y, w, h, color| {
            let coverage = color.a() as f32 / 255.0;
            if coverage == 0.0 {
                return;
            }
            let px = (box_x + x as f32).round() as i64;
            let py = (box_y + y as f32).round() as i64;
            for dy in 0..h as i64 {
                for dx in 0..w as i64 {
                    let (tx, ty) = (px + dx, py + dy);
                    if tx < 0 || ty < 0 || tx >= width as i64 || ty >= height as i64 {
                        continue;
                    }
                    let idx = ty as usize * width + tx as usize;
                    data[idx] = data[idx].max(coverage);
                }
            }
        },
    );

    let layer = Layer::new(width, height, 1, data, Role::None)?;
    Ok(Image::new().with_layer(&params.layer, layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_parsing() {
        let anchor: Anchor = "lt".parse().unwrap();
        assert_eq!(anchor, Anchor::new(HAnchor::Left, VAnchor::Top));
        let anchor: Anchor = "mm".parse().unwrap();
        assert_eq!(anchor, Anchor::default());
        let anchor: Anchor = "cb".parse().unwrap();
        assert_eq!(anchor, Anchor::new(HAnchor::Center, VAnchor::Bottom));
        assert!("x".parse::<Anchor>().is_err());
        assert!("xx".parse::<Anchor>().is_err());
        assert!("ltb".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_empty_string_is_zero_layer() {
        let params = TextParams {
            res: (32, 16),
            ..TextParams::default()
        };
        let image = text(&params).unwrap();
        let layer = image.layer("A").unwrap();
        assert_eq!(layer.shape(), (32, 16, 1));
        assert_eq!(layer.bounds(), (0.0, 0.0));
    }

    #[test]
    fn test_missing_font_file() {
        let params = TextParams {
            font: "/no/such/font.ttf".into(),
            text: "hi".into(),
            ..TextParams::default()
        };
        assert!(matches!(text(&params), Err(OpsError::FontNotFound(_))));
    }

    #[test]
    fn test_unparseable_font_file_rejected() {
        // The file exists but holds no face, so loading it must fail
        // rather than silently shaping with a fallback family.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-font.ttf");
        std::fs::write(&path, b"junk").unwrap();
        let params = TextParams {
            font: path.display().to_string(),
            text: "hi".into(),
            ..TextParams::default()
        };
        assert!(matches!(text(&params), Err(OpsError::FontNotFound(_))));
    }

    #[test]
    fn test_coverage_stays_normalized() {
        let params = TextParams {
            text: "strata".into(),
            res: (128, 64),
            ..TextParams::default()
        };
        let image = text(&params).unwrap();
        let layer = image.layer("A").unwrap();
        assert_eq!(layer.shape(), (128, 64, 1));
        let (lo, hi) = layer.bounds();
        assert!(lo >= 0.0);
        assert!(hi <= 1.0);
    }
}
