//! Edge preserving anisotropic Kuwahara filtering.
//!
//! ```
//! use kuwahara::image::{Image, ImageSize};
//! use kuwahara::imgproc::kuwahara::{kuwahara, KuwaharaParams};
//!
//! let size = ImageSize { width: 16, height: 12 };
//! let src = Image::<f32, 3>::from_size_val(size, 0.5).unwrap();
//!
//! let out = kuwahara(&src, &KuwaharaParams::default().with_kernel_skew(1.0)).unwrap();
//! assert_eq!(out.filtered.size(), size);
//! ```

#[doc(inline)]
pub use kuwahara_image as image;

#[doc(inline)]
pub use kuwahara_imgproc as imgproc;
