use kuwahara_image::{Image, ImageError};

use super::{kernels, separable_filter_with_strategy};
use crate::padding::PaddingMode;
use crate::parallel::{self, ExecutionStrategy};

/// Separable gaussian blur with per-axis kernel sizes and standard deviations.
///
/// A size of 1 or a non positive sigma leaves that axis untouched. Fails when `src`
/// and `dst` differ in size.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter_with_strategy(src, dst, &kernel_x, &kernel_y, padding, strategy)
}

/// Unnormalized 3x3 Sobel derivatives of every channel, written to `dx` and `dy`.
///
/// The kernels of [`kernels::sobel_kernel3`] are correlated with the image, so a
/// brightness increase to the right gives a positive `dx`. Taps outside the image
/// follow `padding`.
pub fn spatial_gradient<const C: usize>(
    src: &Image<f32, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dx.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dx.cols(),
            dx.rows(),
        ));
    }

    if src.size() != dy.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dy.cols(),
            dy.rows(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let (sobel_x, sobel_y) = kernels::sobel_kernel3();
    let rows_table = padding.index_table(rows, 1);
    let cols_table = padding.index_table(cols, 1);
    let src_data = src.as_slice();

    parallel::for_each_row_pair(
        strategy,
        dx.as_slice_mut(),
        cols * C,
        dy.as_slice_mut(),
        cols * C,
        |r, dx_row, dy_row| {
            for c in 0..cols {
                let mut sum_x = [0.0f32; C];
                let mut sum_y = [0.0f32; C];
                for ky in 0..3 {
                    let Some(row) = rows_table[r + ky] else {
                        continue;
                    };
                    for kx in 0..3 {
                        let Some(col) = cols_table[c + kx] else {
                            continue;
                        };
                        let (wx, wy) = (sobel_x[ky][kx], sobel_y[ky][kx]);
                        let offset = (row * cols + col) * C;
                        for ch in 0..C {
                            let val = src_data[offset + ch];
                            sum_x[ch] += val * wx;
                            sum_y[ch] += val * wy;
                        }
                    }
                }
                dx_row[c * C..(c + 1) * C].copy_from_slice(&sum_x);
                dy_row[c * C..(c + 1) * C].copy_from_slice(&sum_y);
            }
        },
    );

    Ok(())
}
