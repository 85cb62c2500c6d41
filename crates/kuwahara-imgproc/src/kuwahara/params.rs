use serde::{Deserialize, Serialize};

use super::KuwaharaError;

/// Selects how the sector kernels are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KuwaharaVariant {
    /// One fixed bank of eight sector kernels shared by every pixel.
    #[default]
    Isotropic,

    /// Sector kernels rotated onto the local tangent and stretched by the local coherency.
    Anisotropic,
}

/// Parameters of the kuwahara filter.
///
/// All radii are in pixels at the resolution of the filtered image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KuwaharaParams {
    /// Standard deviation of the gaussian applied to the structure tensor, `>= 0`.
    pub blur_radius: f32,
    /// Standard deviation of the radial gaussian of the sector kernels, `> 0`.
    pub kernel_radius: f32,
    /// Elongation of the sectors along the local tangent, `>= 0`. Anisotropic variant only.
    pub kernel_skew: f32,
    /// How strongly high variance sectors are suppressed, `>= 0`.
    pub sharpness: f32,
    /// Kernel shaping variant.
    pub variant: KuwaharaVariant,
}

impl Default for KuwaharaParams {
    fn default() -> Self {
        Self {
            blur_radius: 2.0,
            kernel_radius: 4.0,
            kernel_skew: 0.0,
            sharpness: 8.0,
            variant: KuwaharaVariant::Isotropic,
        }
    }
}

impl KuwaharaParams {
    /// Set the structure tensor blur radius.
    pub fn with_blur_radius(mut self, blur_radius: f32) -> Self {
        self.blur_radius = blur_radius;
        self
    }

    /// Set the sector kernel radius.
    pub fn with_kernel_radius(mut self, kernel_radius: f32) -> Self {
        self.kernel_radius = kernel_radius;
        self
    }

    /// Set the sector skew and switch to the anisotropic variant.
    pub fn with_kernel_skew(mut self, kernel_skew: f32) -> Self {
        self.kernel_skew = kernel_skew;
        self.variant = KuwaharaVariant::Anisotropic;
        self
    }

    /// Set the blend sharpness.
    pub fn with_sharpness(mut self, sharpness: f32) -> Self {
        self.sharpness = sharpness;
        self
    }

    /// Set the kernel variant.
    pub fn with_variant(mut self, variant: KuwaharaVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Multiply both radii by `scale`, for images resampled by that factor.
    pub fn scaled(mut self, scale: f32) -> Self {
        self.blur_radius *= scale;
        self.kernel_radius *= scale;
        self
    }

    /// Check that every parameter is finite and inside its domain.
    pub fn validate(&self) -> Result<(), KuwaharaError> {
        check("blur_radius", self.blur_radius, |v| v >= 0.0, "must be >= 0")?;
        check("kernel_radius", self.kernel_radius, |v| v > 0.0, "must be > 0")?;
        check("kernel_skew", self.kernel_skew, |v| v >= 0.0, "must be >= 0")?;
        check("sharpness", self.sharpness, |v| v >= 0.0, "must be >= 0")?;
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f32,
    in_domain: impl Fn(f32) -> bool,
    reason: &'static str,
) -> Result<(), KuwaharaError> {
    if !value.is_finite() {
        return Err(KuwaharaError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if !in_domain(value) {
        return Err(KuwaharaError::InvalidParameter {
            name,
            value,
            reason,
        });
    }
    Ok(())
}
