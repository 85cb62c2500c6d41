use kuwahara_image::{Image, ImageError};

use crate::padding::PaddingMode;
use crate::parallel::{self, ExecutionStrategy};

/// Row kernel, column kernel and the border they share.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    padding: PaddingMode,
}

impl SeparableFilter<'_> {
    fn apply<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        strategy: ExecutionStrategy,
    ) {
        let rows = src.rows();
        let cols = src.cols();
        if rows == 0 || cols == 0 {
            return;
        }

        let half_x = self.kernel_x.len() / 2;
        let half_y = self.kernel_y.len() / 2;
        let cols_table = self.padding.index_table(cols, half_x);
        let rows_table = self.padding.index_table(rows, half_y);

        let src_data = src.as_slice();
        let mut temp = vec![0.0f32; src_data.len()];

        // horizontal
        parallel::for_each_row(strategy, &mut temp, cols * C, |r, row_temp| {
            let src_row = &src_data[r * cols * C..(r + 1) * cols * C];
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (k, &w) in self.kernel_x.iter().enumerate() {
                    let Some(x) = cols_table[c + k] else {
                        continue;
                    };
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += src_row[x * C + ch] * w;
                    }
                }
                row_temp[c * C..(c + 1) * C].copy_from_slice(&acc);
            }
        });

        // vertical
        let temp = &temp;
        parallel::for_each_row(strategy, dst.as_slice_mut(), cols * C, |r, row_dst| {
            row_dst.iter_mut().for_each(|v| *v = 0.0);
            for (k, &w) in self.kernel_y.iter().enumerate() {
                let Some(y) = rows_table[r + k] else {
                    continue;
                };
                let temp_row = &temp[y * cols * C..(y + 1) * cols * C];
                row_dst
                    .iter_mut()
                    .zip(temp_row.iter())
                    .for_each(|(d, &t)| *d += t * w);
            }
        });
    }
}

/// Correlate `src` with `kernel_x` along rows, then with `kernel_y` along columns.
///
/// Both kernels are centered on their middle tap, so odd lengths are expected; the
/// row pass goes through a temporary buffer. Taps outside the image follow `padding`.
///
/// Fails when a kernel is empty or when `src` and `dst` differ in size.
pub fn separable_filter_with_strategy<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(ImageError::InvalidKernelLength(
            kernel_x.len(),
            kernel_y.len(),
        ));
    }

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let filter = SeparableFilter {
        kernel_x,
        kernel_y,
        padding,
    };
    filter.apply(src, dst, strategy);
    Ok(())
}
