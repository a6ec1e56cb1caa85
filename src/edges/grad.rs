//! Image gradients (Sobel/Scharr) normalized to per-pixel derivatives.
//!
//! - Correlates a 3×3 kernel pair (`X` and `Y`) with border clamping.
//! - Kernels are divided by the sum of their absolute weights, so a unit
//!   intensity ramp yields a gradient of 1 and `gx`/`gy` share the units of
//!   the input raster. Signs follow the positive axis directions.
//! - Every channel is differentiated independently; outputs keep the input
//!   dimensions and channel count.
//!
//! Complexity: O(W·H·C) per pass; memory: two float buffers.
use crate::image::{ImageF32, ImageView, ImageViewMut};
use serde::{Deserialize, Serialize};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
const SOBEL_NORM: f32 = 1.0 / 8.0;

const SCHARR_KERNEL_X: Kernel3 = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_KERNEL_Y: Kernel3 = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];
const SCHARR_NORM: f32 = 1.0 / 32.0;

/// Horizontal and vertical derivative rasters.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (correlation with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (correlation with kernel Y)
    pub gy: ImageF32,
}

/// Directional derivative operator used for every pyramid level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientOperator {
    /// 3×3 Sobel, matching a kernel size of 3.
    #[default]
    Sobel,
    /// 3×3 Scharr; better rotational symmetry.
    Scharr,
}

impl GradientOperator {
    /// Sum of absolute weights of the unnormalized kernel (8 for Sobel, 32
    /// for Scharr). Squared, it converts a Hessian of normalized gradients
    /// back to the scale of raw kernel responses.
    pub fn kernel_weight(self) -> f32 {
        match self {
            GradientOperator::Sobel => 1.0 / SOBEL_NORM,
            GradientOperator::Scharr => 1.0 / SCHARR_NORM,
        }
    }

    pub fn apply(self, image: &ImageF32) -> Grad {
        match self {
            GradientOperator::Sobel => sobel_gradients(image),
            GradientOperator::Scharr => scharr_gradients(image),
        }
    }
}

fn gradients_with_kernels(
    l: &ImageF32,
    kernel_x: &Kernel3,
    kernel_y: &Kernel3,
    norm: f32,
) -> Grad {
    let w = l.w;
    let h = l.h;
    let ch = l.channels;
    let mut gx = ImageF32::with_channels(w, h, ch);
    let mut gy = ImageF32::with_channels(w, h, ch);

    if l.is_empty() {
        return Grad { gx, gy };
    }

    for y in 0..h {
        let rows = [
            l.row(y.saturating_sub(1)),
            l.row(y),
            l.row((y + 1).min(h - 1)),
        ];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1) * ch, x * ch, (x + 1).min(w - 1) * ch];
            for c in 0..ch {
                let mut sum_x = 0.0;
                let mut sum_y = 0.0;
                for (ky, row) in rows.iter().enumerate() {
                    let kx_row = &kernel_x[ky];
                    let ky_row = &kernel_y[ky];
                    let (a, b, d) = (row[x_idx[0] + c], row[x_idx[1] + c], row[x_idx[2] + c]);
                    sum_x += a * kx_row[0] + b * kx_row[1] + d * kx_row[2];
                    sum_y += a * ky_row[0] + b * ky_row[1] + d * ky_row[2];
                }
                out_gx[x * ch + c] = sum_x * norm;
                out_gy[x * ch + c] = sum_y * norm;
            }
        }
    }

    Grad { gx, gy }
}

/// Compute normalized Sobel gradients.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    gradients_with_kernels(l, &SOBEL_KERNEL_X, &SOBEL_KERNEL_Y, SOBEL_NORM)
}

/// Compute normalized Scharr gradients.
pub fn scharr_gradients(l: &ImageF32) -> Grad {
    gradients_with_kernels(l, &SCHARR_KERNEL_X, &SCHARR_KERNEL_Y, SCHARR_NORM)
}
