//! # strata-ops
//!
//! The operator catalog for the strata layered image toolkit.
//!
//! Every operator is a pure function: it borrows zero or more
//! [`Image`](strata_core::Image)s plus scalar or dimension-expression
//! parameters and returns a new image, leaving its inputs untouched. That
//! makes operators safe to schedule concurrently and trivially cacheable
//! by an external graph runner.
//!
//! ## Modules
//!
//! - [`fill`] - constant-color layer generation
//! - [`merge`] - layer-set union, delete, rename, remap
//! - [`transform`] - offset, resize, scale, affine warps
//! - [`blur`] - separable Gaussian
//! - [`composite`] - masked over-compositing with rotation and scaling
//! - [`color`] - channel dot products, grayscale, colormapping
//! - [`palette`] - color palettes for [`colormap`]
//! - [`text`] - glyph coverage rasterization
//! - [`cryptomatte`] - Cryptomatte matte extraction
//! - [`registry`] - named-input dispatch for external schedulers
//! - [`sampler`] - shared resampling kernels
//!
//! ## Example
//!
//! ```
//! use strata_core::Role;
//! use strata_ops::{fill, rgb2gray};
//!
//! let card = fill("C", (64, 64), &[1.0, 0.5, 0.0], Role::Rgb)?;
//! let gray = rgb2gray(&card, "C")?;
//! assert_eq!(gray.layer("C")?.depth(), 1);
//! # Ok::<(), strata_ops::OpsError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blur;
pub mod color;
pub mod composite;
pub mod cryptomatte;
pub mod error;
pub mod fill;
pub mod merge;
pub mod palette;
pub mod registry;
pub mod sampler;
pub mod text;
pub mod transform;

pub use blur::gaussian;
pub use color::{colormap, dot, rgb2gray};
pub use composite::{CompositeParams, composite};
pub use cryptomatte::{DecodeParams, decode, name_to_id};
pub use error::{OpsError, OpsResult};
pub use fill::fill;
pub use merge::{Selection, delete, merge, remap, rename};
pub use palette::Palette;
pub use registry::{Inputs, Operator, Registry, Value};
pub use sampler::Filter;
pub use text::{Anchor, TextParams, text};
pub use transform::{Affine, OffsetMode, offset, resize, scale, warp_affine};
