//! Constant-color layer generation.

use strata_core::{Image, Layer, Role};
use tracing::debug;

use crate::error::OpsResult;

/// Generates an image holding one constant-valued layer.
///
/// Every pixel of the new layer equals `values`; the channel count is the
/// length of `values` and must agree with `role`. This is the usual starting
/// point of a pipeline - a canvas for [`crate::composite`] or
/// [`crate::text`] to draw into.
///
/// # Example
///
/// ```
/// use strata_core::Role;
/// use strata_ops::fill;
///
/// let image = fill("C", (256, 128), &[1.0, 0.5, 0.0], Role::Rgb).unwrap();
/// assert_eq!(image.layer("C").unwrap().shape(), (256, 128, 3));
/// ```
pub fn fill(layer: &str, res: (usize, usize), values: &[f32], role: Role) -> OpsResult<Image> {
    let filled = Layer::filled(res.0, res.1, values, role)?;
    debug!(
        layer,
        width = res.0,
        height = res.1,
        depth = values.len(),
        "fill"
    );
    Ok(Image::new().with_layer(layer, filled))
}
