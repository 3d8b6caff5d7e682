//! # strata-core
//!
//! Core types for the strata layered image toolkit.
//!
//! This crate provides the in-memory image model shared by every other
//! strata crate:
//!
//! - [`Image`] - a mapping of unique layer names to [`Layer`] data
//! - [`Layer`] - one rectangular buffer of linear float samples
//! - [`Role`] - semantic tags describing how layer samples are interpreted
//! - [`MetaValue`] / [`Metadata`] - free-form metadata round-tripped by codecs
//! - [`color`] - the sRGB transfer function pair used by 8-bit codecs
//!
//! ## Design
//!
//! Images and layers are immutable value objects. Operators (see
//! `strata-ops`) consume images by reference and return new ones; nothing
//! in this crate mutates shared state, so independent operator invocations
//! are trivially safe to run concurrently from an external scheduler.
//!
//! Layers within one image may differ in resolution and channel count.
//! Operators that require uniform resolution state that in their own
//! contracts; the image model does not enforce it.
//!
//! ## Crate structure
//!
//! `strata-core` sits at the bottom of the workspace:
//!
//! ```text
//! strata-core (this crate)      strata-units
//!    ^                             ^
//!    |                             |
//!    +-- strata-ops  (operators) --+
//!    +-- strata-io   (codecs)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod error;
pub mod image;
pub mod layer;
pub mod metadata;
pub mod role;

pub use error::{Error, Result};
pub use image::Image;
pub use layer::Layer;
pub use metadata::{MetaValue, Metadata};
pub use role::Role;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use strata_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::layer::Layer;
    pub use crate::metadata::{MetaValue, Metadata};
    pub use crate::role::Role;
}
