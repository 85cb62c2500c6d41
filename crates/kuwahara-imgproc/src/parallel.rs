use rayon::prelude::*;

use kuwahara_image::Image;

/// Controls how row-wise image operations are executed.
///
/// Every stage writes each output pixel exactly once and reads only immutable
/// inputs, so the same closure runs unchanged on either adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Process rows in parallel on the current Rayon thread pool.
    ///
    /// Callers wanting a specific number of threads install their own pool with
    /// [`rayon::ThreadPool::install`] around the call.
    Parallel,

    /// Parallel for buffers of at least [`ExecutionStrategy::AUTO_PARALLEL_ELEMENTS`]
    /// elements, serial otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Element count from which [`ExecutionStrategy::Auto`] switches to parallel rows.
    pub const AUTO_PARALLEL_ELEMENTS: usize = 100_000;

    /// Whether a destination buffer of `num_elements` values runs in parallel.
    pub fn is_parallel(&self, num_elements: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => num_elements >= Self::AUTO_PARALLEL_ELEMENTS,
        }
    }
}

/// Run `f(row, dst_row)` for every row of `dst`.
///
/// `row_len` is the number of elements per row (width * channels).
pub fn for_each_row<T, F>(strategy: ExecutionStrategy, dst: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    if strategy.is_parallel(dst.len()) {
        dst.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        dst.chunks_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    }
}

/// Run `f(row, dst1_row, dst2_row)` for every row of two destination buffers that share a layout.
pub fn for_each_row_pair<T, U, F>(
    strategy: ExecutionStrategy,
    dst1: &mut [T],
    row_len1: usize,
    dst2: &mut [U],
    row_len2: usize,
    f: F,
) where
    T: Send,
    U: Send,
    F: Fn(usize, &mut [T], &mut [U]) + Send + Sync,
{
    if row_len1 == 0 || row_len2 == 0 {
        return;
    }

    if strategy.is_parallel(dst1.len()) {
        dst1.par_chunks_mut(row_len1)
            .zip(dst2.par_chunks_mut(row_len2))
            .enumerate()
            .for_each(|(r, (row1, row2))| f(r, row1, row2));
    } else {
        dst1.chunks_mut(row_len1)
            .zip(dst2.chunks_mut(row_len2))
            .enumerate()
            .for_each(|(r, (row1, row2))| f(r, row1, row2));
    }
}

/// Apply a function to each pixel of `src`, writing the matching pixel of `dst`.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    strategy: ExecutionStrategy,
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Sync,
    T2: Send,
{
    let cols = src.cols();
    let src_data = src.as_slice();
    for_each_row(strategy, dst.as_slice_mut(), C2 * cols, |r, dst_row| {
        let src_row = &src_data[r * C1 * cols..(r + 1) * C1 * cols];
        src_row
            .chunks_exact(C1)
            .zip(dst_row.chunks_exact_mut(C2))
            .for_each(|(src_pixel, dst_pixel)| f(src_pixel, dst_pixel));
    });
}

/// Apply a function to each pair of co-located pixels of two sources.
pub fn par_iter_rows_two<T1, const C1: usize, T2, const C2: usize, T3, const C3: usize>(
    strategy: ExecutionStrategy,
    src1: &Image<T1, C1>,
    src2: &Image<T2, C2>,
    dst: &mut Image<T3, C3>,
    f: impl Fn(&[T1], &[T2], &mut [T3]) + Send + Sync,
) where
    T1: Sync,
    T2: Sync,
    T3: Send,
{
    let cols = src1.cols();
    let src1_data = src1.as_slice();
    let src2_data = src2.as_slice();
    for_each_row(strategy, dst.as_slice_mut(), C3 * cols, |r, dst_row| {
        let src1_row = &src1_data[r * C1 * cols..(r + 1) * C1 * cols];
        let src2_row = &src2_data[r * C2 * cols..(r + 1) * C2 * cols];
        src1_row
            .chunks_exact(C1)
            .zip(src2_row.chunks_exact(C2))
            .zip(dst_row.chunks_exact_mut(C3))
            .for_each(|((p1, p2), dst_pixel)| f(p1, p2, dst_pixel));
    });
}
