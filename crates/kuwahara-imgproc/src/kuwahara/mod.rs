//! Edge preserving smoothing steered by the local image structure.
//!
//! The filter runs in stages, each a free function over [`kuwahara_image::Image`] rasters:
//!
//! 1. [`color_gradient`] and [`structure_tensor`] build the per pixel tensor `(J11, J22, J12)`.
//! 2. [`blur_structure_tensor`] smooths it with a gaussian.
//! 3. [`anisotropy`] extracts coherency and orientation, [`anisotropy_visualization`]
//!    renders them.
//! 4. [`SectorKernelBank`] holds eight gaussian wedges covering the circle.
//! 5. [`sector_statistics`] and [`blend_sectors`] average the sectors, favouring the
//!    homogeneous ones. [`anisotropic_kuwahara`] does the same with kernels warped per pixel.
//!
//! [`KuwaharaFilter`] chains the stages and owns the intermediate rasters.

mod anisotropic;
mod blend;
mod eigen;
mod error;
mod params;
mod pipeline;
mod sector_kernel;
mod sector_stats;
mod structure_tensor;

pub use anisotropic::{anisotropic_kuwahara, WarpedSectorKernel};
pub use blend::{blend_pixel, blend_sectors, blend_weight, BLEND_SCALE};
pub use eigen::{anisotropy, anisotropy_visualization, TensorEigen, DEGENERATE_COHERENCY};
pub use error::KuwaharaError;
pub use params::{KuwaharaParams, KuwaharaVariant};
pub use pipeline::{kuwahara, KuwaharaFilter, KuwaharaOutput};
pub use sector_kernel::{
    gaussian_2d, in_sector, sector_support_radius, wrap_angle, KernelTap, SectorKernel,
    SectorKernelBank, NUM_SECTORS, SECTOR_HALF_WIDTH, SECTOR_STEP,
};
pub use sector_stats::{correlate_taps, sector_statistics, SectorStatistics};
pub use structure_tensor::{blur_structure_tensor, color_gradient, structure_tensor, BORDER};
