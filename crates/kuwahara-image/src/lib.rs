#![deny(missing_docs)]
//! Raster containers shared by the kuwahara crates.

/// Dense interleaved rasters and their sizes.
pub mod image;

/// Errors raised when building or indexing a raster.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
