use super::filters::{SeparableFilter, StaticSeparableFilter};
use super::options::PyramidOptions;
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Multi-resolution copies of one frame; `levels[0]` is the input itself.
#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    pub levels: Vec<ImageF32>,
}

impl Pyramid {
    /// Build `options.levels` levels, each from the previous one by (optional)
    /// separable blur and 2× decimation. Level `l` pixel `(x, y)` sits at
    /// level-0 pixel `(x·2^l, y·2^l)`, so point coordinates halve per level.
    pub fn build_f32(image: ImageF32, options: PyramidOptions) -> Self {
        let count = options.levels.max(1);
        let mut levels = Vec::with_capacity(count);
        levels.push(image);
        if count == 1 {
            return Self { levels };
        }

        let blur_limit = options.blur_levels.min(count - 1);
        let mut horiz_cache = Vec::new();
        let mut cached_rows = Vec::new();
        for lvl in 1..count {
            let prev = &levels[lvl - 1];
            let (nw, nh) = (prev.w.div_ceil(2), prev.h.div_ceil(2));
            let mut down = ImageF32::with_channels(nw, nh, prev.channels);
            if lvl <= blur_limit {
                downsample_with_filter(
                    prev,
                    &mut down,
                    options.filter,
                    &mut horiz_cache,
                    &mut cached_rows,
                );
            } else {
                downsample_without_filter(prev, &mut down);
            }
            levels.push(down);
        }

        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn into_levels(self) -> Vec<ImageF32> {
        self.levels
    }
}

fn downsample_without_filter(src: &ImageF32, dst: &mut ImageF32) {
    if src.is_empty() || dst.is_empty() {
        return;
    }
    let ch = src.channels;
    let max_sx = src.w - 1;
    let max_sy = src.h - 1;
    for y in 0..dst.h {
        let src_row = src.row((y * 2).min(max_sy));
        let dst_row = dst.row_mut(y);
        for (x, dst_px) in dst_row.chunks_exact_mut(ch).enumerate() {
            let sx = (x * 2).min(max_sx) * ch;
            dst_px.copy_from_slice(&src_row[sx..sx + ch]);
        }
    }
}

fn downsample_with_filter(
    src: &ImageF32,
    dst: &mut ImageF32,
    filter: StaticSeparableFilter,
    horiz_cache: &mut Vec<f32>,
    cached_rows: &mut Vec<isize>,
) {
    if src.is_empty() || dst.is_empty() {
        return;
    }
    let taps = filter.taps();
    if taps.is_empty() {
        downsample_without_filter(src, dst);
        return;
    }
    let radius = filter.radius();
    let taps_len = taps.len();
    let cache_width = dst.w * dst.channels;

    horiz_cache.clear();
    horiz_cache.resize(cache_width * taps_len, 0.0);
    cached_rows.clear();
    cached_rows.resize(taps_len, -1);

    for y in 0..dst.h {
        let center_sy = (y * 2) as isize;
        for ky in 0..taps_len {
            let offset = ky as isize - radius as isize;
            let sy = clamp_index(center_sy + offset, src.h) as isize;
            if cached_rows[ky] != sy {
                let src_row = src.row(sy as usize);
                let cache_row = &mut horiz_cache[ky * cache_width..(ky + 1) * cache_width];
                filter_row_downsample(src_row, src.channels, cache_row, taps, radius);
                cached_rows[ky] = sy;
            }
        }
        let dst_row = dst.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (ky, &tap) in taps.iter().enumerate() {
                acc += tap * horiz_cache[ky * cache_width + x];
            }
            *dst_px = acc;
        }
    }
}

/// Horizontal blur of one interleaved row, keeping every other pixel.
fn filter_row_downsample(row: &[f32], ch: usize, out: &mut [f32], taps: &[f32], radius: usize) {
    let src_w = row.len() / ch;
    if src_w == 0 || out.is_empty() {
        return;
    }
    for (x, dst_px) in out.chunks_exact_mut(ch).enumerate() {
        let sx = (x * 2) as isize;
        for (c, dst) in dst_px.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let idx = clamp_index(sx + k as isize - radius as isize, src_w);
                acc += tap * row[idx * ch + c];
            }
            *dst = acc;
        }
    }
}

fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 {
        return 0;
    }
    idx.clamp(0, upper as isize - 1) as usize
}
