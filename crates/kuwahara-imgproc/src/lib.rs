#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image filtering module.
pub mod filter;

/// anisotropic kuwahara filter and its stages.
pub mod kuwahara;

/// border extension policies for neighborhood operations.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;
