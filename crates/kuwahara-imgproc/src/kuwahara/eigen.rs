use std::f32::consts::{FRAC_PI_2, PI};

use kuwahara_image::{Image, ImageError};

use crate::color::hsv_to_rgb;
use crate::parallel::{self, ExecutionStrategy};

/// Coherency reported where the tensor trace `λ1 + λ2` vanishes (flat regions).
pub const DEGENERATE_COHERENCY: f32 = 0.0;

/// Closed form eigen analysis of one symmetric 2x2 structure tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorEigen {
    /// The largest eigenvalue.
    pub lambda1: f32,
    /// The smallest eigenvalue, `lambda2 <= lambda1`.
    pub lambda2: f32,
    /// `(λ1 - λ2) / (λ1 + λ2)` in `[0, 1]`, or [`DEGENERATE_COHERENCY`] when the trace is zero.
    pub coherency: f32,
    /// Direction of minimum change in `(-π/2, π/2]`.
    ///
    /// Measured counter-clockwise from the +x axis with y pointing up, so a vertical
    /// edge gives `π/2` and a horizontal edge gives `0`.
    pub orientation: f32,
}

impl TensorEigen {
    /// Analyse the tensor `[[j11, j12], [j12, j22]]`.
    pub fn new(j11: f32, j22: f32, j12: f32) -> Self {
        let trace = j11 + j22;
        let diff = j11 - j22;
        let root = (diff * diff + 4.0 * j12 * j12).sqrt();

        let lambda1 = 0.5 * (trace + root);
        let lambda2 = 0.5 * (trace - root);

        let coherency = if trace > 0.0 && trace.is_finite() {
            (root / trace).clamp(0.0, 1.0)
        } else {
            DEGENERATE_COHERENCY
        };

        let mut orientation = 0.5 * (2.0 * j12).atan2(j22 - j11);
        if orientation <= -FRAC_PI_2 {
            orientation += PI;
        }

        Self {
            lambda1,
            lambda2,
            coherency,
            orientation,
        }
    }

    /// Unit tangent of the local structure in image coordinates (x right, y down).
    pub fn tangent(orientation: f32) -> (f32, f32) {
        let (sin, cos) = orientation.sin_cos();
        (cos, -sin)
    }
}

/// Compute per pixel coherency and orientation from the smoothed structure tensor.
///
/// # Arguments
///
/// * `tensor` - The smoothed structure tensor field `(J11, J22, J12)`.
/// * `coherency` - The coherency in `[0, 1]`.
/// * `orientation` - The dominant orientation in `(-π/2, π/2]`.
/// * `strategy` - The execution strategy.
pub fn anisotropy(
    tensor: &Image<f32, 3>,
    coherency: &mut Image<f32, 1>,
    orientation: &mut Image<f32, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if tensor.size() != coherency.size() {
        return Err(ImageError::InvalidImageSize(
            tensor.cols(),
            tensor.rows(),
            coherency.cols(),
            coherency.rows(),
        ));
    }

    if tensor.size() != orientation.size() {
        return Err(ImageError::InvalidImageSize(
            tensor.cols(),
            tensor.rows(),
            orientation.cols(),
            orientation.rows(),
        ));
    }

    let cols = tensor.cols();
    let tensor_data = tensor.as_slice();
    parallel::for_each_row_pair(
        strategy,
        coherency.as_slice_mut(),
        cols,
        orientation.as_slice_mut(),
        cols,
        |r, coherency_row, orientation_row| {
            let tensor_row = &tensor_data[r * cols * 3..(r + 1) * cols * 3];
            for ((px, coh), ori) in tensor_row
                .chunks_exact(3)
                .zip(coherency_row.iter_mut())
                .zip(orientation_row.iter_mut())
            {
                let eigen = TensorEigen::new(px[0], px[1], px[2]);
                *coh = eigen.coherency;
                *ori = eigen.orientation;
            }
        },
    );

    Ok(())
}

/// Render coherency and orientation as a color image for inspection.
///
/// The hue encodes the orientation (`orientation · 2/π · 180` degrees, so both ends of
/// the orientation range meet at red) and the value encodes the coherency, at full
/// saturation: flat regions are black, strongly oriented ones fully colored.
///
/// # Arguments
///
/// * `coherency` - The coherency in `[0, 1]`.
/// * `orientation` - The orientation in `(-π/2, π/2]`.
/// * `dst` - The RGB visualization.
/// * `strategy` - The execution strategy.
pub fn anisotropy_visualization(
    coherency: &Image<f32, 1>,
    orientation: &Image<f32, 1>,
    dst: &mut Image<f32, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if coherency.size() != orientation.size() {
        return Err(ImageError::InvalidImageSize(
            coherency.cols(),
            coherency.rows(),
            orientation.cols(),
            orientation.rows(),
        ));
    }

    if coherency.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            coherency.cols(),
            coherency.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_two(strategy, coherency, orientation, dst, |coh, ori, rgb| {
        let hue = ori[0] * 2.0 / PI * 180.0;
        rgb.copy_from_slice(&hsv_to_rgb(hue, 1.0, coh[0]));
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_degenerate_tensor() {
        let eigen = TensorEigen::new(0.0, 0.0, 0.0);
        assert_eq!(eigen.coherency, DEGENERATE_COHERENCY);
        assert_eq!(eigen.lambda1, 0.0);
        assert_eq!(eigen.lambda2, 0.0);
        assert!(eigen.orientation.is_finite());
    }

    #[test]
    fn test_isotropic_tensor() {
        let eigen = TensorEigen::new(2.0, 2.0, 0.0);
        assert_eq!(eigen.coherency, 0.0);
        assert_eq!(eigen.lambda1, 2.0);
        assert_eq!(eigen.lambda2, 2.0);
    }

    #[test]
    fn test_horizontal_gradient() {
        // vertical edge: all energy in gx
        let eigen = TensorEigen::new(48.0, 0.0, 0.0);
        assert_eq!(eigen.coherency, 1.0);
        assert_eq!(eigen.lambda1, 48.0);
        assert_eq!(eigen.lambda2, 0.0);
        assert_relative_eq!(eigen.orientation, FRAC_PI_2);

        let (tx, ty) = TensorEigen::tangent(eigen.orientation);
        assert_relative_eq!(tx, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ty.abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_vertical_gradient() {
        // horizontal edge: all energy in gy
        let eigen = TensorEigen::new(0.0, 5.0, 0.0);
        assert_eq!(eigen.coherency, 1.0);
        assert_relative_eq!(eigen.orientation, 0.0);
    }

    #[test]
    fn test_diagonal_gradient_tangent_is_perpendicular() {
        let (gx, gy) = (3.0f32, 1.5f32);
        let eigen = TensorEigen::new(gx * gx, gy * gy, gx * gy);
        let (tx, ty) = TensorEigen::tangent(eigen.orientation);
        assert_relative_eq!(tx * gx + ty * gy, 0.0, epsilon = 1e-5);
        assert_relative_eq!(eigen.coherency, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_orientation_range_and_ordering() {
        let samples = [
            (1.0, 2.0, 0.5),
            (3.0, 0.1, -1.0),
            (0.0, 1.0, -0.0),
            (1e-3, 1e-3, 1e-3),
            (10.0, 10.0, -10.0),
            (7.0, 0.0, -0.0),
        ];
        for (j11, j22, j12) in samples {
            let eigen = TensorEigen::new(j11, j22, j12);
            assert!(eigen.lambda1 >= eigen.lambda2);
            assert!((0.0..=1.0).contains(&eigen.coherency));
            assert!(eigen.orientation > -FRAC_PI_2 && eigen.orientation <= FRAC_PI_2);
        }
    }

    #[test]
    fn test_anisotropy_fields() -> Result<(), ImageError> {
        let tensor = Image::<f32, 3>::new(
            [3, 1].into(),
            vec![0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        )?;
        let mut coherency = Image::from_size_val(tensor.size(), -1.0)?;
        let mut orientation = Image::from_size_val(tensor.size(), -1.0)?;

        anisotropy(
            &tensor,
            &mut coherency,
            &mut orientation,
            ExecutionStrategy::Serial,
        )?;

        assert_eq!(coherency.as_slice(), &[0.0, 1.0, 0.0]);
        assert_relative_eq!(orientation.as_slice()[1], FRAC_PI_2);
        Ok(())
    }

    #[test]
    fn test_anisotropy_visualization() -> Result<(), ImageError> {
        let coherency = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 1.0, 0.5])?;
        let orientation = Image::<f32, 1>::new([3, 1].into(), vec![0.3, 0.0, FRAC_PI_2])?;
        let mut vis = Image::from_size_val(coherency.size(), 0.0)?;

        anisotropy_visualization(
            &coherency,
            &orientation,
            &mut vis,
            ExecutionStrategy::Serial,
        )?;

        // flat is black, orientation 0 is red, π/2 lands on cyan (hue 180)
        assert_eq!(&vis.as_slice()[0..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&vis.as_slice()[3..6], &[1.0, 0.0, 0.0]);
        assert_relative_eq!(vis.as_slice()[6], 0.0, epsilon = 1e-5);
        assert_relative_eq!(vis.as_slice()[7], 0.5, epsilon = 1e-5);
        assert_relative_eq!(vis.as_slice()[8], 0.5, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn test_anisotropy_visualization_matches_hsv_image() -> Result<(), ImageError> {
        let size = [7, 3].into();
        let coherency =
            Image::<f32, 1>::new(size, (0..21).map(|i| i as f32 / 20.0).collect())?;
        let orientation = Image::<f32, 1>::new(
            size,
            (0..21).map(|i| -FRAC_PI_2 + 0.15 * (i + 1) as f32).collect(),
        )?;

        let mut vis = Image::from_size_val(size, 0.0)?;
        anisotropy_visualization(
            &coherency,
            &orientation,
            &mut vis,
            ExecutionStrategy::Parallel,
        )?;

        let hsv = Image::<f32, 3>::new(
            size,
            coherency
                .as_slice()
                .iter()
                .zip(orientation.as_slice())
                .flat_map(|(&c, &o)| [o * 2.0 / PI * 180.0, 1.0, c])
                .collect(),
        )?;
        let mut rgb = Image::from_size_val(size, 0.0)?;
        crate::color::rgb_from_hsv(&hsv, &mut rgb, ExecutionStrategy::Serial)?;
        assert_eq!(vis, rgb);

        let mut wrong = Image::<f32, 3>::from_size_val([7, 2].into(), 0.0)?;
        assert_eq!(
            anisotropy_visualization(
                &coherency,
                &orientation,
                &mut wrong,
                ExecutionStrategy::Serial
            ),
            Err(ImageError::InvalidImageSize(7, 3, 7, 2))
        );
        Ok(())
    }
}
