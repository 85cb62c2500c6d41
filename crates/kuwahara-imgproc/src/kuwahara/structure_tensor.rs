use kuwahara_image::{Image, ImageError};

use crate::filter::{self, kernels};
use crate::padding::PaddingMode;
use crate::parallel::{self, ExecutionStrategy};

/// Border policy shared by the gradient, the tensor blur and the sector statistics.
pub const BORDER: PaddingMode = PaddingMode::Reflect101;

/// Compute the horizontal and vertical Sobel derivatives of every channel.
///
/// # Arguments
///
/// * `src` - The input color image.
/// * `gx` - The horizontal derivative per channel.
/// * `gy` - The vertical derivative per channel.
/// * `strategy` - The execution strategy.
pub fn color_gradient(
    src: &Image<f32, 3>,
    gx: &mut Image<f32, 3>,
    gy: &mut Image<f32, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    filter::spatial_gradient(src, gx, gy, BORDER, strategy)
}

/// Build the structure tensor field from per channel derivatives.
///
/// The output channels are `(J11, J22, J12)` with
/// `J11 = Σ gx²`, `J22 = Σ gy²` and `J12 = Σ gx·gy`, summed over the color channels.
///
/// # Arguments
///
/// * `gx` - The horizontal derivative per channel.
/// * `gy` - The vertical derivative per channel.
/// * `dst` - The structure tensor field.
/// * `strategy` - The execution strategy.
pub fn structure_tensor(
    gx: &Image<f32, 3>,
    gy: &Image<f32, 3>,
    dst: &mut Image<f32, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if gx.size() != gy.size() {
        return Err(ImageError::InvalidImageSize(
            gx.cols(),
            gx.rows(),
            gy.cols(),
            gy.rows(),
        ));
    }

    if gx.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            gx.cols(),
            gx.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_two(strategy, gx, gy, dst, |gx_pixel, gy_pixel, dst_pixel| {
        let mut j11 = 0.0;
        let mut j22 = 0.0;
        let mut j12 = 0.0;
        for (&dx, &dy) in gx_pixel.iter().zip(gy_pixel.iter()) {
            j11 += dx * dx;
            j22 += dy * dy;
            j12 += dx * dy;
        }
        dst_pixel[0] = j11;
        dst_pixel[1] = j22;
        dst_pixel[2] = j12;
    });

    Ok(())
}

/// Smooth each structure tensor component with an isotropic gaussian.
///
/// The kernel side is the smallest odd integer `>= 2.5 * blur_radius` and its sigma is
/// `blur_radius`; a zero radius copies the field unchanged.
///
/// # Arguments
///
/// * `src` - The structure tensor field.
/// * `dst` - The smoothed structure tensor field.
/// * `blur_radius` - The gaussian standard deviation in pixels.
/// * `strategy` - The execution strategy.
pub fn blur_structure_tensor(
    src: &Image<f32, 3>,
    dst: &mut Image<f32, 3>,
    blur_radius: f32,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    let kernel_size = kernels::gaussian_kernel_size(blur_radius);
    filter::gaussian_blur(
        src,
        dst,
        (kernel_size, kernel_size),
        (blur_radius, blur_radius),
        BORDER,
        strategy,
    )
}
