use std::f32::consts::{FRAC_PI_4, FRAC_PI_8, PI};

/// Number of angular sectors covering the full circle.
pub const NUM_SECTORS: usize = 8;

/// Angular step between consecutive sector centers.
pub const SECTOR_STEP: f32 = FRAC_PI_4;

/// Half of the angular width of one sector.
pub const SECTOR_HALF_WIDTH: f32 = FRAC_PI_8;

/// Tap radius of the sector kernels for a given gaussian radius: `ceil(2.5 * kernel_radius)`.
pub fn sector_support_radius(kernel_radius: f32) -> usize {
    (2.5 * kernel_radius).ceil().max(1.0) as usize
}

/// Wrap an angle to `(-π, π]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Whether a tap at polar angle `angle` belongs to sector `s`.
///
/// The window `[s·45° - 22.5°, s·45° + 22.5°]` is closed at both ends, so taps lying
/// exactly on a boundary count for both neighbouring sectors.
#[inline]
pub fn in_sector(angle: f32, s: usize) -> bool {
    wrap_angle(angle - s as f32 * SECTOR_STEP).abs() <= SECTOR_HALF_WIDTH
}

/// Unnormalized 2D gaussian `exp(-(x² + y²) / (2σ²))`, one at the origin.
///
/// The `1 / (2πσ²)` factor is left out since every kernel is renormalized. The
/// origin is special cased so that a `σ²` underflowing to zero still gives a finite
/// center weight instead of `0 / 0`.
#[inline]
pub fn gaussian_2d(x: f32, y: f32, sigma: f32) -> f32 {
    let dist_sq = x * x + y * y;
    if dist_sq == 0.0 {
        return 1.0;
    }
    (-dist_sq / (2.0 * sigma * sigma)).exp()
}

/// One non zero weight of a sector kernel, at offset `(dx, dy)` from the center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelTap {
    /// Column offset, growing to the right.
    pub dx: isize,
    /// Row offset, growing downwards.
    pub dy: isize,
    /// Normalized weight.
    pub weight: f32,
}

/// A gaussian restricted to a 45° wedge and normalized to sum one.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorKernel {
    radius: usize,
    weights: Vec<f32>,
    taps: Vec<KernelTap>,
}

impl SectorKernel {
    /// Build the kernel of sector `sector` for the given gaussian radius.
    ///
    /// If the angular mask leaves no weight at all the kernel stays all zero and
    /// [`SectorKernel::is_empty`] reports it, instead of dividing by zero.
    pub fn new(sector: usize, kernel_radius: f32) -> Self {
        let radius = sector_support_radius(kernel_radius);
        let side = 2 * radius + 1;
        let r = radius as isize;

        let mut weights = vec![0.0f32; side * side];
        for y in -r..=r {
            for x in -r..=r {
                let angle = (y as f32).atan2(x as f32);
                if !in_sector(angle, sector) {
                    continue;
                }
                let idx = (y + r) as usize * side + (x + r) as usize;
                weights[idx] = gaussian_2d(x as f32, y as f32, kernel_radius);
            }
        }

        let total = weights.iter().sum::<f32>();
        if total.is_finite() && total > 0.0 {
            weights.iter_mut().for_each(|w| *w /= total);
        } else {
            log::warn!(
                "sector {} kernel has no weight for kernel radius {}",
                sector,
                kernel_radius
            );
            weights.fill(0.0);
        }

        let taps = weights
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > 0.0)
            .map(|(idx, &weight)| KernelTap {
                dx: (idx % side) as isize - r,
                dy: (idx / side) as isize - r,
                weight,
            })
            .collect();

        Self {
            radius,
            weights,
            taps,
        }
    }

    /// Half of the side length of the kernel.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Side length of the kernel, `2 * radius + 1`.
    pub fn side(&self) -> usize {
        2 * self.radius + 1
    }

    /// The dense weights, row-major, `side * side` values.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// The non zero taps of the kernel.
    pub fn taps(&self) -> &[KernelTap] {
        &self.taps
    }

    /// Whether the angular mask removed every tap.
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// The eight rotated sector kernels covering the full circle.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorKernelBank {
    kernel_radius: f32,
    kernels: Vec<SectorKernel>,
}

impl SectorKernelBank {
    /// Build the bank for the given gaussian radius; sector `s` is centered at `s · 45°`.
    pub fn new(kernel_radius: f32) -> Self {
        let kernels = (0..NUM_SECTORS)
            .map(|s| SectorKernel::new(s, kernel_radius))
            .collect();
        Self {
            kernel_radius,
            kernels,
        }
    }

    /// The gaussian radius the bank was built for.
    pub fn kernel_radius(&self) -> f32 {
        self.kernel_radius
    }

    /// The sector kernels, indexed by sector.
    pub fn kernels(&self) -> &[SectorKernel] {
        &self.kernels
    }

    /// Tap radius shared by all kernels.
    pub fn radius(&self) -> usize {
        sector_support_radius(self.kernel_radius)
    }
}
