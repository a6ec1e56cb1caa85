//! Sub-pixel window extraction and window/raster overlap tests.
//!
//! A [`Window`] is an axis-aligned, integer-sized rectangle whose top-left
//! corner may sit at a fractional position. [`sample_subpixel`] reads the
//! `width × height` grid starting at that corner with bilinear interpolation.
//! Because every sample shares the same fractional offset, the four bilinear
//! weights are computed once per window.
//!
//! Taps that fall one pixel past the raster edge clamp to the border row or
//! column (replicate). Windows reaching further out are rejected; callers gate
//! on [`intersection_percent`] before sampling.
use super::ImageF32;
use crate::error::{FlowError, FlowResult};
use crate::types::Point2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    /// Left edge (may be fractional).
    pub x: f32,
    /// Top edge (may be fractional).
    pub y: f32,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// `size × size` window whose centre pixel sits at `center`.
    ///
    /// The top-left corner is `center - floor(size / 2)` on both axes, so odd
    /// sizes are symmetric around the centre.
    pub fn centered(center: Point2, size: usize) -> Self {
        let half = (size / 2) as f32;
        Self {
            x: center[0] - half,
            y: center[1] - half,
            width: size,
            height: size,
        }
    }

    /// Window covering the whole raster.
    pub fn of_image(image: &ImageF32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: image.w,
            height: image.h,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width as f32
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height as f32
    }
}

/// Fraction of overlap between two windows: intersection area divided by the
/// smaller window's area. `1.0` means the smaller window lies fully inside the
/// larger one, `0.0` means no overlap. Non-finite coordinates yield `0.0`.
pub fn intersection_percent(a: &Window, b: &Window) -> f32 {
    let min_area = a.area().min(b.area());
    if min_area.is_nan() || min_area <= 0.0 {
        return 0.0;
    }
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.right().min(b.right());
    let y1 = a.bottom().min(b.bottom());
    let iw = x1 - x0;
    let ih = y1 - y0;
    if !(iw > 0.0 && ih > 0.0) {
        return 0.0;
    }
    (iw * ih / min_area).min(1.0)
}

/// Bilinearly sample `window` from `image` into `out`.
///
/// `out` is resized to `width * height * channels` and filled row-major with
/// interleaved channels. Fails when the window extends more than one pixel
/// beyond the raster or its position is not finite.
pub fn sample_subpixel(image: &ImageF32, window: &Window, out: &mut Vec<f32>) -> FlowResult<()> {
    let ch = image.channels;
    let out_len = window.width * window.height * ch;
    let reaches_outside = !(window.x >= -1.0
        && window.y >= -1.0
        && window.right() <= image.w as f32 + 1.0
        && window.bottom() <= image.h as f32 + 1.0);
    if image.is_empty() || reaches_outside {
        return Err(FlowError::WindowOutOfBounds {
            x: window.x,
            y: window.y,
            width: window.width,
            height: window.height,
            image_w: image.w,
            image_h: image.h,
        });
    }
    out.clear();
    out.resize(out_len, 0.0);

    let fx = window.x.floor();
    let fy = window.y.floor();
    let ax = window.x - fx;
    let ay = window.y - fy;
    let bx = 1.0 - ax;
    let by = 1.0 - ay;
    let w00 = bx * by;
    let w10 = ax * by;
    let w01 = bx * ay;
    let w11 = ax * ay;

    let max_x = image.w as isize - 1;
    let max_y = image.h as isize - 1;
    let x_base = fx as isize;
    let y_base = fy as isize;

    for j in 0..window.height {
        let y0 = (y_base + j as isize).clamp(0, max_y) as usize;
        let y1 = (y_base + j as isize + 1).clamp(0, max_y) as usize;
        let row0 = &image.data[y0 * image.stride..];
        let row1 = &image.data[y1 * image.stride..];
        let dst_row = &mut out[j * window.width * ch..(j + 1) * window.width * ch];
        for i in 0..window.width {
            let x0 = (x_base + i as isize).clamp(0, max_x) as usize * ch;
            let x1 = (x_base + i as isize + 1).clamp(0, max_x) as usize * ch;
            for c in 0..ch {
                dst_row[i * ch + c] = w00 * row0[x0 + c]
                    + w10 * row0[x1 + c]
                    + w01 * row1[x0 + c]
                    + w11 * row1[x1 + c];
            }
        }
    }
    Ok(())
}
