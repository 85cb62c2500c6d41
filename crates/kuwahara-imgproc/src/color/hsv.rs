use crate::parallel::{self, ExecutionStrategy};
use kuwahara_image::{Image, ImageError};

/// Convert an HSV image to an RGB image.
///
/// # Arguments
///
/// * `src` - The input HSV image with the following channels:
///   * H: The hue in degrees, any value is wrapped to [0, 360).
///   * S: The saturation in the range [0, 1].
///   * V: The value in the range [0, 1].
/// * `dst` - The output RGB image, each channel in the range [0, 1].
/// * `strategy` - The execution strategy.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use kuwahara_image::{Image, ImageSize};
/// use kuwahara_imgproc::color::rgb_from_hsv;
/// use kuwahara_imgproc::parallel::ExecutionStrategy;
///
/// let hsv = Image::<f32, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![120.0, 1.0, 1.0],
/// )
/// .unwrap();
///
/// let mut rgb = Image::<f32, 3>::from_size_val(hsv.size(), 0.0).unwrap();
///
/// rgb_from_hsv(&hsv, &mut rgb, ExecutionStrategy::Serial).unwrap();
///
/// assert_eq!(rgb.as_slice(), &[0.0, 1.0, 0.0]);
/// ```
pub fn rgb_from_hsv(
    src: &Image<f32, 3>,
    dst: &mut Image<f32, 3>,
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

    parallel::par_iter_rows(strategy, src, dst, |src_pixel, dst_pixel| {
        let [r, g, b] = hsv_to_rgb(src_pixel[0], src_pixel[1], src_pixel[2]);
        dst_pixel[0] = r;
        dst_pixel[1] = g;
        dst_pixel[2] = b;
    });

    Ok(())
}

/// Convert a single HSV triplet to RGB. The hue is given in degrees.
#[inline]
pub(crate) fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0);
    let chroma = v * s;
    let x = chroma * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - chroma;

    let (r, g, b) = if h < 60.0 {
        (chroma, x, 0.0)
    } else if h < 120.0 {
        (x, chroma, 0.0)
    } else if h < 180.0 {
        (0.0, chroma, x)
    } else if h < 240.0 {
        (0.0, x, chroma)
    } else if h < 300.0 {
        (x, 0.0, chroma)
    } else {
        (chroma, 0.0, x)
    };

    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kuwahara_image::ImageSize;

    #[test]
    fn test_hsv_to_rgb_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0.0, 1.0, 0.0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0.0, 0.0, 1.0]);
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(-120.0, 1.0, 1.0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_hsv_to_rgb_gray() {
        assert_eq!(hsv_to_rgb(75.0, 0.0, 0.5), [0.5, 0.5, 0.5]);
        assert_eq!(hsv_to_rgb(200.0, 1.0, 0.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rgb_from_hsv() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let hsv = Image::<f32, 3>::new(size, vec![30.0, 1.0, 1.0, 300.0, 0.5, 0.8])?;
        let mut rgb = Image::<f32, 3>::from_size_val(size, 0.0)?;

        rgb_from_hsv(&hsv, &mut rgb, ExecutionStrategy::Serial)?;

        let expected = [1.0, 0.5, 0.0, 0.8, 0.4, 0.8];
        for (&got, &exp) in rgb.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(got, exp, epsilon = 1e-6);
        }
        Ok(())
    }
}
