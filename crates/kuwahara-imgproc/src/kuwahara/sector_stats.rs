use kuwahara_image::{Image, ImageError, ImageSize};

use super::sector_kernel::{KernelTap, SectorKernelBank, NUM_SECTORS};
use super::structure_tensor::BORDER;
use crate::parallel::{self, ExecutionStrategy};

/// Per sector weighted mean and variance fields of a color image.
#[derive(Debug, Clone)]
pub struct SectorStatistics {
    means: Vec<Image<f32, 3>>,
    variances: Vec<Image<f32, 1>>,
    deviation: Image<f32, 1>,
}

impl SectorStatistics {
    /// Allocate zeroed fields for an image of the given size.
    pub fn from_size(size: ImageSize) -> Result<Self, ImageError> {
        let means = (0..NUM_SECTORS)
            .map(|_| Image::from_size_val(size, 0.0))
            .collect::<Result<Vec<_>, _>>()?;
        let variances = (0..NUM_SECTORS)
            .map(|_| Image::from_size_val(size, 0.0))
            .collect::<Result<Vec<_>, _>>()?;
        let deviation = Image::from_size_val(size, 0.0)?;
        Ok(Self {
            means,
            variances,
            deviation,
        })
    }

    /// The size of every field.
    pub fn size(&self) -> ImageSize {
        self.deviation.size()
    }

    /// The weighted mean of every sector.
    pub fn means(&self) -> &[Image<f32, 3>] {
        &self.means
    }

    /// The weighted variance of every sector, summed over the color channels.
    pub fn variances(&self) -> &[Image<f32, 1>] {
        &self.variances
    }
}

/// Correlate `src` with a sparse kernel given by its non zero taps.
///
/// Taps reaching outside the image follow the shared border policy.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `taps` - The kernel taps, offsets relative to the output pixel.
/// * `radius` - The largest absolute tap offset.
/// * `dst` - The destination image with shape (H, W, C).
/// * `strategy` - The execution strategy.
pub fn correlate_taps<const C: usize>(
    src: &Image<f32, C>,
    taps: &[KernelTap],
    radius: usize,
    dst: &mut Image<f32, C>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let rows_table = BORDER.index_table(rows, radius);
    let cols_table = BORDER.index_table(cols, radius);
    let src_data = src.as_slice();
    let r0 = radius as isize;

    parallel::for_each_row(strategy, dst.as_slice_mut(), cols * C, |r, dst_row| {
        for c in 0..cols {
            let mut acc = [0.0f32; C];
            for tap in taps {
                let Some(row) = rows_table[(r as isize + r0 + tap.dy) as usize] else {
                    continue;
                };
                let Some(col) = cols_table[(c as isize + r0 + tap.dx) as usize] else {
                    continue;
                };
                let offset = (row * cols + col) * C;
                for ch in 0..C {
                    acc[ch] += tap.weight * src_data[offset + ch];
                }
            }
            dst_row[c * C..(c + 1) * C].copy_from_slice(&acc);
        }
    });

    Ok(())
}

/// Compute the weighted mean and variance of `src` under every sector kernel.
///
/// The mean of sector `s` is the correlation of `src` with kernel `s`. Its variance is
/// the correlation, with the same kernel, of the squared deviation `|I - μ_s|²` summed
/// over the channels. Empty sectors get all zero fields.
///
/// # Arguments
///
/// * `src` - The input color image.
/// * `bank` - The sector kernels.
/// * `stats` - The per sector statistics, sized like `src`.
/// * `strategy` - The execution strategy.
pub fn sector_statistics(
    src: &Image<f32, 3>,
    bank: &SectorKernelBank,
    stats: &mut SectorStatistics,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != stats.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            stats.size().width,
            stats.size().height,
        ));
    }

    let radius = bank.radius();
    let SectorStatistics {
        means,
        variances,
        deviation,
    } = stats;

    for ((kernel, mean), variance) in bank
        .kernels()
        .iter()
        .zip(means.iter_mut())
        .zip(variances.iter_mut())
    {
        if kernel.is_empty() {
            mean.as_slice_mut().fill(0.0);
            variance.as_slice_mut().fill(0.0);
            continue;
        }

        correlate_taps(src, kernel.taps(), radius, mean, strategy)?;

        parallel::par_iter_rows_two(strategy, src, &*mean, deviation, |px, mu, dev| {
            dev[0] = px
                .iter()
                .zip(mu.iter())
                .map(|(&p, &m)| (p - m) * (p - m))
                .sum();
        });

        correlate_taps(&*deviation, kernel.taps(), radius, variance, strategy)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_correlate_taps_is_not_flipped() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::new([5, 1].into(), vec![0.0, 1.0, 2.0, 3.0, 4.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        let taps = [KernelTap {
            dx: 1,
            dy: 0,
            weight: 1.0,
        }];

        correlate_taps(&src, &taps, 1, &mut dst, ExecutionStrategy::Serial)?;

        // reads the right neighbour, mirrored past the last column
        assert_eq!(dst.as_slice(), &[1.0, 2.0, 3.0, 4.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_constant_image_has_zero_variance() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 7,
            height: 6,
        };
        let src = Image::<f32, 3>::new(
            size,
            (0..size.num_pixels())
                .flat_map(|_| [0.2, 0.5, 0.9])
                .collect(),
        )?;
        let bank = SectorKernelBank::new(1.0);
        let mut stats = SectorStatistics::from_size(size)?;

        sector_statistics(&src, &bank, &mut stats, ExecutionStrategy::Serial)?;

        for (mean, variance) in stats.means().iter().zip(stats.variances()) {
            for px in mean.as_slice().chunks_exact(3) {
                assert_relative_eq!(px[0], 0.2, epsilon = 1e-5);
                assert_relative_eq!(px[1], 0.5, epsilon = 1e-5);
                assert_relative_eq!(px[2], 0.9, epsilon = 1e-5);
            }
            for &v in variance.as_slice() {
                assert_relative_eq!(v, 0.0, epsilon = 1e-8);
            }
        }
        Ok(())
    }

    #[test]
    fn test_sectors_facing_away_from_an_edge_are_homogeneous() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 16,
            height: 9,
        };
        let mut src = Image::<f32, 3>::from_size_val(size, 0.0)?;
        for y in 0..size.height {
            for x in 8..size.width {
                for ch in 0..3 {
                    src.set_pixel(x, y, ch, 1.0)?;
                }
            }
        }
        let bank = SectorKernelBank::new(1.0);
        let mut stats = SectorStatistics::from_size(size)?;

        sector_statistics(&src, &bank, &mut stats, ExecutionStrategy::Parallel)?;

        // just left of the step: sector 4 looks left into the dark side, sector 0 right
        let (x, y) = (7, 4);
        assert_relative_eq!(stats.means()[4].get_pixel(x, y, 0)?, 0.0, epsilon = 1e-6);
        assert_relative_eq!(stats.variances()[4].get_pixel(x, y, 0)?, 0.0, epsilon = 1e-6);
        assert!(stats.means()[0].get_pixel(x, y, 0)? > 0.25);
        assert!(stats.variances()[0].get_pixel(x, y, 0)? > 0.0);
        Ok(())
    }

    #[test]
    fn test_empty_sectors_get_zero_fields() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 6,
            height: 5,
        };
        let src = Image::<f32, 3>::new(
            size,
            (0..size.num_pixels() * 3)
                .map(|i| ((i * 11) % 7) as f32 / 6.0)
                .collect(),
        )?;
        let mut stats = SectorStatistics::from_size(size)?;

        // fill every sector first, then reuse the buffers with a center only bank
        let full = SectorKernelBank::new(1.0);
        sector_statistics(&src, &full, &mut stats, ExecutionStrategy::Serial)?;
        let bank = SectorKernelBank::new(1e-3);
        sector_statistics(&src, &bank, &mut stats, ExecutionStrategy::Serial)?;

        assert_eq!(stats.means()[0], src);
        assert!(stats.variances()[0].as_slice().iter().all(|&v| v == 0.0));
        for s in 1..NUM_SECTORS {
            assert!(bank.kernels()[s].is_empty());
            assert!(stats.means()[s].as_slice().iter().all(|&v| v == 0.0));
            assert!(stats.variances()[s].as_slice().iter().all(|&v| v == 0.0));
        }
        Ok(())
    }

    #[test]
    fn test_sector_statistics_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<f32, 3>::from_size_val([4, 4].into(), 0.0)?;
        let bank = SectorKernelBank::new(1.0);
        let mut stats = SectorStatistics::from_size([4, 5].into())?;
        assert_eq!(
            sector_statistics(&src, &bank, &mut stats, ExecutionStrategy::Serial),
            Err(ImageError::InvalidImageSize(4, 4, 4, 5))
        );
        Ok(())
    }
}
