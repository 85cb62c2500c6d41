use std::sync::atomic::{AtomicBool, Ordering};

use kuwahara_image::{Image, ImageError, ImageSize};

use super::anisotropic::anisotropic_kuwahara;
use super::blend::blend_sectors;
use super::eigen::{anisotropy, anisotropy_visualization};
use super::sector_kernel::SectorKernelBank;
use super::sector_stats::{sector_statistics, SectorStatistics};
use super::structure_tensor::{blur_structure_tensor, color_gradient, structure_tensor};
use super::{KuwaharaError, KuwaharaParams, KuwaharaVariant};
use crate::parallel::ExecutionStrategy;

/// The rasters produced by one run of the filter.
#[derive(Debug, Clone)]
pub struct KuwaharaOutput {
    /// The raw structure tensor `(J11, J22, J12)`.
    pub structure_tensor: Image<f32, 3>,
    /// The gaussian smoothed structure tensor.
    pub blurred_structure_tensor: Image<f32, 3>,
    /// The local coherency in `[0, 1]`.
    pub coherency: Image<f32, 1>,
    /// The local orientation in `(-π/2, π/2]`.
    pub orientation: Image<f32, 1>,
    /// Coherency and orientation rendered as RGB.
    pub anisotropy: Image<f32, 3>,
    /// The filtered image.
    pub filtered: Image<f32, 3>,
}

impl KuwaharaOutput {
    /// Allocate zeroed outputs for an image of the given size.
    pub fn new(size: ImageSize) -> Result<Self, ImageError> {
        Ok(Self {
            structure_tensor: Image::from_size_val(size, 0.0)?,
            blurred_structure_tensor: Image::from_size_val(size, 0.0)?,
            coherency: Image::from_size_val(size, 0.0)?,
            orientation: Image::from_size_val(size, 0.0)?,
            anisotropy: Image::from_size_val(size, 0.0)?,
            filtered: Image::from_size_val(size, 0.0)?,
        })
    }
}

/// A kuwahara filter bound to one image size.
///
/// The filter owns the intermediate rasters and the sector kernel bank, so repeated
/// runs at the same resolution reuse them; only the per call scratch rows of the
/// separable blur and the border index tables are allocated again.
///
/// # Example
///
/// ```
/// use kuwahara_image::{Image, ImageSize};
/// use kuwahara_imgproc::kuwahara::{KuwaharaFilter, KuwaharaOutput, KuwaharaParams};
///
/// let size = ImageSize { width: 8, height: 6 };
/// let src = Image::<f32, 3>::from_size_val(size, 0.5).unwrap();
///
/// let params = KuwaharaParams::default().with_kernel_radius(1.0);
/// let mut filter = KuwaharaFilter::new(size, params).unwrap();
/// let mut out = KuwaharaOutput::new(size).unwrap();
/// filter.apply(&src, &mut out).unwrap();
///
/// assert!(out.filtered.as_slice().iter().all(|v| (v - 0.5).abs() < 1e-5));
/// ```
#[derive(Debug, Clone)]
pub struct KuwaharaFilter {
    size: ImageSize,
    params: KuwaharaParams,
    strategy: ExecutionStrategy,
    bank: SectorKernelBank,
    gx: Image<f32, 3>,
    gy: Image<f32, 3>,
    stats: Option<SectorStatistics>,
}

impl KuwaharaFilter {
    /// Create a filter for images of `size`, validating `params`.
    pub fn new(size: ImageSize, params: KuwaharaParams) -> Result<Self, KuwaharaError> {
        params.validate()?;
        Ok(Self {
            size,
            params,
            strategy: ExecutionStrategy::default(),
            bank: SectorKernelBank::new(params.kernel_radius),
            gx: Image::from_size_val(size, 0.0)?,
            gy: Image::from_size_val(size, 0.0)?,
            stats: None,
        })
    }

    /// Use the given execution strategy for every stage.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The image size the filter was created for.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The current parameters.
    pub fn params(&self) -> &KuwaharaParams {
        &self.params
    }

    /// The sector kernels used by the isotropic variant.
    pub fn kernel_bank(&self) -> &SectorKernelBank {
        &self.bank
    }

    /// Replace the parameters; the kernel bank is rebuilt only when the kernel radius changes.
    ///
    /// Invalid parameters are rejected and the previous ones are kept.
    pub fn set_params(&mut self, params: KuwaharaParams) -> Result<(), KuwaharaError> {
        params.validate()?;
        if params.kernel_radius != self.bank.kernel_radius() {
            log::debug!("rebuilding sector kernels for radius {}", params.kernel_radius);
            self.bank = SectorKernelBank::new(params.kernel_radius);
        }
        self.params = params;
        Ok(())
    }

    /// Run every stage on `src`, writing into `out`.
    pub fn apply(
        &mut self,
        src: &Image<f32, 3>,
        out: &mut KuwaharaOutput,
    ) -> Result<(), KuwaharaError> {
        self.run(src, out, None)
    }

    /// Like [`KuwaharaFilter::apply`], returning [`KuwaharaError::Cancelled`] as soon as
    /// `cancel` is found set between two stages.
    pub fn apply_with_cancel(
        &mut self,
        src: &Image<f32, 3>,
        out: &mut KuwaharaOutput,
        cancel: &AtomicBool,
    ) -> Result<(), KuwaharaError> {
        self.run(src, out, Some(cancel))
    }

    fn run(
        &mut self,
        src: &Image<f32, 3>,
        out: &mut KuwaharaOutput,
        cancel: Option<&AtomicBool>,
    ) -> Result<(), KuwaharaError> {
        if src.size() != self.size {
            return Err(ImageError::InvalidImageSize(
                self.size.width,
                self.size.height,
                src.cols(),
                src.rows(),
            )
            .into());
        }

        let check = |stage: &'static str| match cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(KuwaharaError::Cancelled(stage)),
            _ => Ok(()),
        };

        let params = self.params;
        let strategy = self.strategy;
        let total = std::time::Instant::now();

        check("structure_tensor")?;
        let now = std::time::Instant::now();
        color_gradient(src, &mut self.gx, &mut self.gy, strategy)?;
        structure_tensor(&self.gx, &self.gy, &mut out.structure_tensor, strategy)?;
        log::debug!("structure tensor: {:?}", now.elapsed());

        check("blur_structure_tensor")?;
        let now = std::time::Instant::now();
        blur_structure_tensor(
            &out.structure_tensor,
            &mut out.blurred_structure_tensor,
            params.blur_radius,
            strategy,
        )?;
        log::debug!("structure tensor blur: {:?}", now.elapsed());

        check("anisotropy")?;
        let now = std::time::Instant::now();
        anisotropy(
            &out.blurred_structure_tensor,
            &mut out.coherency,
            &mut out.orientation,
            strategy,
        )?;
        anisotropy_visualization(
            &out.coherency,
            &out.orientation,
            &mut out.anisotropy,
            strategy,
        )?;
        log::debug!("anisotropy: {:?}", now.elapsed());

        check("filter")?;
        let now = std::time::Instant::now();
        match params.variant {
            KuwaharaVariant::Isotropic => {
                let stats = match self.stats.take() {
                    Some(stats) => stats,
                    None => SectorStatistics::from_size(self.size)?,
                };
                let stats = self.stats.insert(stats);
                sector_statistics(src, &self.bank, stats, strategy)?;
                blend_sectors(
                    stats,
                    &self.bank,
                    params.sharpness,
                    &mut out.filtered,
                    strategy,
                )?;
            }
            KuwaharaVariant::Anisotropic => {
                anisotropic_kuwahara(
                    src,
                    &out.coherency,
                    &out.orientation,
                    params.kernel_radius,
                    params.kernel_skew,
                    params.sharpness,
                    &mut out.filtered,
                    strategy,
                )?;
            }
        }
        log::debug!("{:?} kuwahara: {:?}", params.variant, now.elapsed());

        log::debug!("elapsed: {:?}", total.elapsed());
        Ok(())
    }
}

/// Run the whole filter once, allocating the outputs.
///
/// # Arguments
///
/// * `src` - The input color image, values nominally in `[0, 1]`.
/// * `params` - The filter parameters.
pub fn kuwahara(
    src: &Image<f32, 3>,
    params: &KuwaharaParams,
) -> Result<KuwaharaOutput, KuwaharaError> {
    let mut filter = KuwaharaFilter::new(src.size(), *params)?;
    let mut out = KuwaharaOutput::new(src.size())?;
    filter.apply(src, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_params_keeps_bank_for_same_radius() -> Result<(), KuwaharaError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let mut filter = KuwaharaFilter::new(size, KuwaharaParams::default())?;
        let bank = filter.kernel_bank().clone();

        filter.set_params(KuwaharaParams::default().with_sharpness(2.0))?;
        assert_eq!(filter.kernel_bank(), &bank);
        assert_eq!(filter.params().sharpness, 2.0);

        filter.set_params(KuwaharaParams::default().with_kernel_radius(1.0))?;
        assert_eq!(filter.kernel_bank().kernel_radius(), 1.0);
        Ok(())
    }

    #[test]
    fn test_set_params_rejects_invalid() -> Result<(), KuwaharaError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let mut filter = KuwaharaFilter::new(size, KuwaharaParams::default())?;
        let res = filter.set_params(KuwaharaParams::default().with_blur_radius(f32::NAN));
        assert!(matches!(res, Err(KuwaharaError::InvalidParameter { .. })));
        assert_eq!(filter.params(), &KuwaharaParams::default());
        Ok(())
    }

    #[test]
    fn test_apply_rejects_wrong_size() -> Result<(), KuwaharaError> {
        let mut filter = KuwaharaFilter::new([4, 4].into(), KuwaharaParams::default())?;
        let src = Image::<f32, 3>::from_size_val([5, 4].into(), 0.0)?;
        let mut out = KuwaharaOutput::new([5, 4].into())?;
        assert_eq!(
            filter.apply(&src, &mut out),
            Err(KuwaharaError::Image(ImageError::InvalidImageSize(4, 4, 5, 4)))
        );
        Ok(())
    }

    #[test]
    fn test_cancel_before_first_stage() -> Result<(), KuwaharaError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let mut filter = KuwaharaFilter::new(size, KuwaharaParams::default())?;
        let src = Image::<f32, 3>::from_size_val(size, 0.3)?;
        let mut out = KuwaharaOutput::new(size)?;

        let cancel = AtomicBool::new(true);
        assert_eq!(
            filter.apply_with_cancel(&src, &mut out, &cancel),
            Err(KuwaharaError::Cancelled("structure_tensor"))
        );
        assert!(out.filtered.as_slice().iter().all(|&v| v == 0.0));

        cancel.store(false, Ordering::Relaxed);
        filter.apply_with_cancel(&src, &mut out, &cancel)?;
        assert!(out.filtered.as_slice().iter().all(|&v| (v - 0.3).abs() < 1e-5));
        Ok(())
    }
}
