use kuwahara_image::{Image, ImageError};

use super::blend::blend_pixel;
use super::eigen::TensorEigen;
use super::sector_kernel::{
    gaussian_2d, in_sector, sector_support_radius, NUM_SECTORS, SECTOR_STEP,
};
use super::structure_tensor::BORDER;
use crate::parallel::{self, ExecutionStrategy};

/// Sector kernels rotated onto a local tangent and stretched along it.
///
/// A tap at offset `(dx, dy)` is expressed in the tangent frame `(u, v)`, then scaled to
/// `(u / a, v · a)` with `a = 1 + skew · coherency`. The scaled offset selects the sector
/// by its angle and the gaussian weight by its length; the support is the ellipse where
/// the scaled offset lies within the tap radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpedSectorKernel {
    sigma: f32,
    radius: f32,
    tangent: (f32, f32),
    stretch: f32,
}

impl WarpedSectorKernel {
    /// Shape the kernel for one pixel.
    pub fn new(kernel_radius: f32, kernel_skew: f32, coherency: f32, orientation: f32) -> Self {
        Self {
            sigma: kernel_radius,
            radius: sector_support_radius(kernel_radius) as f32,
            tangent: TensorEigen::tangent(orientation),
            stretch: 1.0 + kernel_skew * coherency.clamp(0.0, 1.0),
        }
    }

    /// Half side of the square window enclosing the support.
    pub fn window(&self) -> usize {
        (self.radius * self.stretch).ceil() as usize
    }

    /// Map an image offset to the scaled tangent frame.
    #[inline]
    pub fn warp(&self, dx: f32, dy: f32) -> (f32, f32) {
        let (tx, ty) = self.tangent;
        let u = dx * tx + dy * ty;
        let v = -dx * ty + dy * tx;
        (u / self.stretch, v * self.stretch)
    }

    /// The sector angle and unnormalized weight of an offset, `None` outside the support.
    #[inline]
    pub fn tap(&self, dx: f32, dy: f32) -> Option<(f32, f32)> {
        let (u, v) = self.warp(dx, dy);
        if u * u + v * v > self.radius * self.radius {
            return None;
        }
        // the center goes to sector 0 whatever the signs of the rotated zeros
        let angle = if dx == 0.0 && dy == 0.0 {
            0.0
        } else {
            v.atan2(u)
        };
        Some((angle, gaussian_2d(u, v, self.sigma)))
    }
}

#[derive(Clone, Copy, Default)]
struct SectorAccumulator {
    weight: f32,
    sum: [f32; 3],
    sum_sq: f32,
}

impl SectorAccumulator {
    #[inline]
    fn add(&mut self, w: f32, px: &[f32]) {
        self.weight += w;
        for ch in 0..3 {
            self.sum[ch] += w * px[ch];
            self.sum_sq += w * px[ch] * px[ch];
        }
    }

    /// Weighted mean and channel summed variance, `Σw·I²/Σw − |μ|²` clamped at zero.
    fn finish(&self) -> Option<([f32; 3], f32)> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return None;
        }
        let mean = self.sum.map(|v| v / self.weight);
        let mean_sq = mean.iter().map(|m| m * m).sum::<f32>();
        let variance = (self.sum_sq / self.weight - mean_sq).max(0.0);
        Some((mean, variance))
    }
}

/// Filter `src` with sector kernels warped per pixel by the local structure.
///
/// # Arguments
///
/// * `src` - The input color image.
/// * `coherency` - The local coherency in `[0, 1]`.
/// * `orientation` - The local orientation in `(-π/2, π/2]`.
/// * `kernel_radius` - The gaussian radius of the sectors.
/// * `kernel_skew` - How much the sectors stretch along the tangent, `>= 0`.
/// * `sharpness` - The blend sharpness, `>= 0`.
/// * `dst` - The filtered color image.
/// * `strategy` - The execution strategy.
#[allow(clippy::too_many_arguments)]
pub fn anisotropic_kuwahara(
    src: &Image<f32, 3>,
    coherency: &Image<f32, 1>,
    orientation: &Image<f32, 1>,
    kernel_radius: f32,
    kernel_skew: f32,
    sharpness: f32,
    dst: &mut Image<f32, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    for size in [coherency.size(), orientation.size(), dst.size()] {
        if src.size() != size {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                size.width,
                size.height,
            ));
        }
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let max_window = WarpedSectorKernel::new(kernel_radius, kernel_skew, 1.0, 0.0).window();
    let rows_table = BORDER.index_table(rows, max_window);
    let cols_table = BORDER.index_table(cols, max_window);
    let src_data = src.as_slice();
    let coherency_data = coherency.as_slice();
    let orientation_data = orientation.as_slice();

    parallel::for_each_row(strategy, dst.as_slice_mut(), cols * 3, |r, dst_row| {
        for (c, dst_pixel) in dst_row.chunks_exact_mut(3).enumerate() {
            let idx = r * cols + c;
            let kernel = WarpedSectorKernel::new(
                kernel_radius,
                kernel_skew,
                coherency_data[idx],
                orientation_data[idx],
            );
            let window = kernel.window() as isize;

            let mut sectors = [SectorAccumulator::default(); NUM_SECTORS];
            for dy in -window..=window {
                let Some(row) = rows_table[(r as isize + max_window as isize + dy) as usize]
                else {
                    continue;
                };
                for dx in -window..=window {
                    let Some((angle, w)) = kernel.tap(dx as f32, dy as f32) else {
                        continue;
                    };
                    let Some(col) = cols_table[(c as isize + max_window as isize + dx) as usize]
                    else {
                        continue;
                    };
                    let px = &src_data[(row * cols + col) * 3..(row * cols + col) * 3 + 3];

                    let nearest = (angle / SECTOR_STEP).round() as isize;
                    for s in nearest - 1..=nearest + 1 {
                        let s = s.rem_euclid(NUM_SECTORS as isize) as usize;
                        if in_sector(angle, s) {
                            sectors[s].add(w, px);
                        }
                    }
                }
            }

            let mut means = [[0.0f32; 3]; NUM_SECTORS];
            let mut variances = [0.0f32; NUM_SECTORS];
            let mut n = 0;
            for (mean, variance) in sectors.iter().filter_map(SectorAccumulator::finish) {
                means[n] = mean;
                variances[n] = variance;
                n += 1;
            }

            dst_pixel.copy_from_slice(&blend_pixel(&means[..n], &variances[..n], sharpness));
        }
    });

    Ok(())
}
