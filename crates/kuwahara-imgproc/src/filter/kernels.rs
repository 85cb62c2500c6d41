/// A 3x3 kernel, indexed `[row][col]`.
pub type Kernel3 = [[f32; 3]; 3];

/// Sampled 1D gaussian of `kernel_size` taps centered on the middle one, scaled to
/// sum one.
///
/// A single tap or a non positive `sigma` gives the identity kernel `[1.0]`.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    if kernel_size <= 1 || sigma <= 0.0 {
        return vec![1.0];
    }

    let center = (kernel_size - 1) as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;
    let mut kernel = (0..kernel_size)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / denom).exp()
        })
        .collect::<Vec<_>>();

    let total = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|w| *w /= total);
    kernel
}

/// Kernel side length for a gaussian of the given radius.
///
/// The smallest odd integer greater or equal than `2.5 * radius`, and at least 1.
pub fn gaussian_kernel_size(radius: f32) -> usize {
    let size = (2.5 * radius).ceil().max(1.0) as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// The unnormalized 3x3 sobel kernels for the x and y derivatives.
///
/// Both are applied as a correlation; x grows to the right and y grows downwards.
pub fn sobel_kernel3() -> (Kernel3, Kernel3) {
    let kernel_x = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
    let kernel_y = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
    (kernel_x, kernel_y)
}
