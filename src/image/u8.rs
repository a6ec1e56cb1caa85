use super::ImageF32;
use crate::error::{FlowError, FlowResult};

/// Borrowed 8-bit grayscale frame, e.g. a camera buffer with row padding.
#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Borrow a tightly packed `w × h` buffer.
    pub fn from_slice(data: &'a [u8], w: usize, h: usize) -> FlowResult<Self> {
        Self::with_stride(data, w, h, w)
    }

    /// Borrow a buffer whose rows are `stride` bytes apart.
    pub fn with_stride(data: &'a [u8], w: usize, h: usize, stride: usize) -> FlowResult<Self> {
        if stride < w {
            return Err(FlowError::InvalidParams(format!(
                "row stride {stride} is smaller than width {w}"
            )));
        }
        let expected = if h == 0 { 0 } else { (h - 1) * stride + w };
        if data.len() < expected {
            return Err(FlowError::RasterSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { w, h, stride, data })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Promote to an owned f32 raster in 0..255 intensity units.
    pub fn to_f32(&self) -> ImageF32 {
        ImageF32::from_u8(self)
    }
}

impl<'a> super::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_stride_accepts_unpadded_last_row() {
        let data = [1u8; 7];
        let img = ImageU8::with_stride(&data, 3, 2, 4).expect("3x2 view with stride 4");
        assert_eq!(img.get(2, 1), 1);
    }

    #[test]
    fn from_slice_rejects_short_buffer() {
        let data = [0u8; 5];
        assert!(ImageU8::from_slice(&data, 3, 2).is_err());
    }
}
