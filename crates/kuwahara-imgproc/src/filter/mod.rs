//! Generic filtering building blocks.
//!
//! The kuwahara stages use them with reflect-101 borders only; the border mode and the
//! execution strategy stay parameters so the blur and the gradient can be used on
//! their own.

/// Gaussian and Sobel kernels.
pub mod kernels;

mod ops;
pub use ops::*;

mod separable_filter;
pub use separable_filter::*;
