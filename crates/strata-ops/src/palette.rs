//! Ordered color palettes for [`crate::colormap`].

use strata_core::color::srgb_to_linear;

use crate::error::{OpsError, OpsResult};

/// An ordered list of linear RGB stops sampled by piecewise-linear
/// interpolation over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<[f32; 3]>,
}

impl Palette {
    /// Creates a palette from linear RGB stops. At least one stop is
    /// required.
    pub fn new(stops: Vec<[f32; 3]>) -> OpsResult<Self> {
        if stops.is_empty() {
            return Err(OpsError::invalid_parameter(
                "a palette needs at least one stop",
            ));
        }
        Ok(Self { stops })
    }

    /// Looks up a built-in palette by name.
    ///
    /// Available: `"gray"`, `"bluered"`, `"blackbody"`. Stops are stored
    /// sRGB-encoded and converted to linear here.
    pub fn named(name: &str) -> Option<Self> {
        let srgb: &[[f32; 3]] = match name {
            "gray" => &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            "bluered" => &[
                [0.129, 0.400, 0.674],
                [0.572, 0.772, 0.870],
                [0.968, 0.968, 0.968],
                [0.956, 0.647, 0.509],
                [0.792, 0.000, 0.125],
            ],
            "blackbody" => &[
                [0.0, 0.0, 0.0],
                [0.498, 0.0, 0.0],
                [1.0, 0.5, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 1.0, 1.0],
            ],
            _ => return None,
        };
        let stops = srgb
            .iter()
            .map(|stop| stop.map(srgb_to_linear))
            .collect();
        Some(Self { stops })
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false; construction rejects empty palettes.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Returns a palette with the stop order flipped.
    pub fn reversed(&self) -> Self {
        let mut stops = self.stops.clone();
        stops.reverse();
        Self { stops }
    }

    /// Maps scalar samples to interleaved linear RGB.
    ///
    /// Each value is normalized against `range` before lookup; a
    /// degenerate range maps everything to the first stop.
    pub fn linear_map(&self, values: &[f32], range: (f32, f32)) -> Vec<f32> {
        let span = range.1 - range.0;
        let mut out = Vec::with_capacity(values.len() * 3);
        for &v in values {
            let t = if span > 0.0 { (v - range.0) / span } else { 0.0 };
            out.extend_from_slice(&self.sample(t));
        }
        out
    }

    /// Maps category indices to interleaved linear RGB, cycling through
    /// the stops without interpolation.
    pub fn categorical_map(&self, indices: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(indices.len() * 3);
        for &i in indices {
            out.extend_from_slice(&self.stops[i % self.stops.len()]);
        }
        out
    }

    /// Samples the palette at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> [f32; 3] {
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }
        let pos = t.clamp(0.0, 1.0) * last as f32;
        let lo = (pos.floor() as usize).min(last - 1);
        let frac = pos - lo as f32;
        let a = self.stops[lo];
        let b = self.stops[lo + 1];
        [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
        ]
    }
}
