use kuwahara_image::{Image, ImageError};

use super::sector_kernel::{SectorKernelBank, NUM_SECTORS};
use super::sector_stats::SectorStatistics;
use crate::parallel::{self, ExecutionStrategy};

/// Sensitivity of the blend weights to the sector variance.
pub const BLEND_SCALE: f32 = 1000.0;

/// Weight of a sector with the given variance: `1 / (1 + (k·σ²)^(sharpness/2))`.
///
/// The weight is in `[0, 1]`, decreasing with the variance. A zero sharpness gives every
/// sector the same weight.
#[inline]
pub fn blend_weight(variance: f32, sharpness: f32) -> f32 {
    let spread = (BLEND_SCALE * variance.max(0.0)).powf(0.5 * sharpness);
    1.0 / (1.0 + spread)
}

/// Blend sector means into one color, weighting each by [`blend_weight`].
///
/// `means` and `variances` hold the non empty sectors only. When every weight vanishes
/// the plain average of the means is returned; with no sector at all the result is black.
pub fn blend_pixel(means: &[[f32; 3]], variances: &[f32], sharpness: f32) -> [f32; 3] {
    let mut acc = [0.0f32; 3];
    let mut total = 0.0f32;
    for (mean, &variance) in means.iter().zip(variances) {
        let w = blend_weight(variance, sharpness);
        total += w;
        for ch in 0..3 {
            acc[ch] += w * mean[ch];
        }
    }

    if total > 0.0 && total.is_finite() {
        return acc.map(|v| v / total);
    }

    if means.is_empty() {
        return acc;
    }

    let mut avg = [0.0f32; 3];
    for mean in means {
        for ch in 0..3 {
            avg[ch] += mean[ch];
        }
    }
    avg.map(|v| v / means.len() as f32)
}

/// Combine the per sector statistics into the filtered image.
///
/// # Arguments
///
/// * `stats` - The per sector means and variances.
/// * `bank` - The sector kernels the statistics were computed with; empty sectors are skipped.
/// * `sharpness` - The blend sharpness, `>= 0`.
/// * `dst` - The filtered color image.
/// * `strategy` - The execution strategy.
pub fn blend_sectors(
    stats: &SectorStatistics,
    bank: &SectorKernelBank,
    sharpness: f32,
    dst: &mut Image<f32, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if stats.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            stats.size().width,
            stats.size().height,
            dst.cols(),
            dst.rows(),
        ));
    }

    let active = bank
        .kernels()
        .iter()
        .enumerate()
        .filter(|(_, kernel)| !kernel.is_empty())
        .map(|(s, _)| s)
        .collect::<Vec<_>>();

    let cols = dst.cols();
    let means = stats.means();
    let variances = stats.variances();

    parallel::for_each_row(strategy, dst.as_slice_mut(), cols * 3, |r, dst_row| {
        let mut pixel_means = [[0.0f32; 3]; NUM_SECTORS];
        let mut pixel_variances = [0.0f32; NUM_SECTORS];
        for (c, dst_pixel) in dst_row.chunks_exact_mut(3).enumerate() {
            let idx = r * cols + c;
            for (k, &s) in active.iter().enumerate() {
                pixel_means[k].copy_from_slice(&means[s].as_slice()[idx * 3..idx * 3 + 3]);
                pixel_variances[k] = variances[s].as_slice()[idx];
            }
            let n = active.len();
            let blended = blend_pixel(&pixel_means[..n], &pixel_variances[..n], sharpness);
            dst_pixel.copy_from_slice(&blended);
        }
    });

    Ok(())
}
