//! Owned f32 raster in row-major, channel-interleaved layout.
//!
//! Intensities are kept in their native units (0..255 for 8-bit sources); the
//! tracker's eigenvalue gate is normalized against that range. Multi-channel
//! rasters store `channels` consecutive samples per pixel and `stride` counts
//! f32 elements between rows.
use super::traits::ImageView;
use super::u8::ImageU8;
use crate::error::{FlowError, FlowResult};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Samples per pixel
    pub channels: usize,
    /// Number of f32 elements between consecutive rows (>= `w * channels`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized single-channel buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::with_channels(w, h, 1)
    }

    /// Construct a zero-initialized buffer with `channels` samples per pixel.
    pub fn with_channels(w: usize, h: usize, channels: usize) -> Self {
        Self {
            w,
            h,
            channels,
            stride: w * channels,
            data: vec![0.0; w * h * channels],
        }
    }

    /// Wrap an existing tightly packed buffer.
    pub fn from_raw(w: usize, h: usize, channels: usize, data: Vec<f32>) -> FlowResult<Self> {
        let expected = w * h * channels;
        if data.len() < expected {
            return Err(FlowError::RasterSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            w,
            h,
            channels,
            stride: w * channels,
            data,
        })
    }

    /// Convert an 8-bit grayscale view, keeping 0..255 intensity units.
    pub fn from_u8(gray: &ImageU8<'_>) -> Self {
        let mut out = Self::new(gray.w, gray.h);
        for y in 0..gray.h {
            let src = &gray.data[y * gray.stride..y * gray.stride + gray.w];
            let start = y * out.stride;
            for (dst, &v) in out.data[start..start + gray.w].iter_mut().zip(src) {
                *dst = v as f32;
            }
        }
        out
    }

    #[inline]
    /// Convert (x, y, channel) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize, c: usize) -> usize {
        y * self.stride + x * self.channels + c
    }
    #[inline]
    /// Get the first-channel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y, 0)]
    }
    #[inline]
    pub fn get_c(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[self.idx(x, y, c)]
    }
    #[inline]
    /// Set the first-channel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y, 0);
        self.data[i] = v;
    }
    #[inline]
    pub fn set_c(&mut self, x: usize, y: usize, c: usize, v: f32) {
        let i = self.idx(x, y, c);
        self.data[i] = v;
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0 || self.channels == 0
    }

    /// True when both rasters have the same width, height and channel count.
    pub fn same_shape(&self, other: &ImageF32) -> bool {
        self.w == other.w && self.h == other.h && self.channels == other.channels
    }

    /// Sample-wise equality ignoring padding beyond each row.
    pub fn same_content(&self, other: &ImageF32) -> bool {
        if !self.same_shape(other) {
            return false;
        }
        self.rows().zip(other.rows()).all(|(a, b)| a == b)
    }
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn channels(&self) -> usize {
        self.channels
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w * self.channels]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[f32]> {
        let len = self.w * self.h * self.channels;
        (self.stride == self.w * self.channels).then_some(&self.data[..len])
    }
}

impl super::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w * self.channels;
        &mut self.data[start..end]
    }
}
