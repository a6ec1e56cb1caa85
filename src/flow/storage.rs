//! Per-session pyramid cache for a pair of frames.
//!
//! [`PyrLkStorage`] holds the image pyramid and per-level gradients of the
//! previous and current frame. In a video loop the current frame of one call
//! is usually the previous frame of the next; `process` detects that case by
//! comparing the incoming previous frame against the cached current level 0
//! and moves the cached bundles over instead of rebuilding them.
//!
//! Levels are built coarse-from-fine: level 0 is the input raster, level `k`
//! is level `k-1` blurred with the 5-tap binomial kernel and decimated by 2.
use crate::diagnostics::TimingBreakdown;
use crate::edges::GradientOperator;
use crate::error::{FlowError, FlowResult};
use crate::image::ImageF32;
use crate::pyramid::{Pyramid, PyramidOptions};
use log::debug;
use std::time::Instant;

/// Raster and derivatives of one frame on one pyramid level.
#[derive(Clone, Debug)]
pub struct LevelBundle {
    pub image: ImageF32,
    pub grad_x: ImageF32,
    pub grad_y: ImageF32,
    /// Operator that produced `grad_x`/`grad_y`.
    pub gradient: GradientOperator,
}

impl LevelBundle {
    pub fn new(image: ImageF32, gradient: GradientOperator) -> Self {
        let grad = gradient.apply(&image);
        Self {
            image,
            grad_x: grad.gx,
            grad_y: grad.gy,
            gradient,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.image.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.h
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.image.channels
    }
}

/// Build the full bundle stack (`pyr_levels + 1` entries) for one frame.
fn build_levels(image: &ImageF32, pyr_levels: usize, gradient: GradientOperator) -> Vec<LevelBundle> {
    Pyramid::build_f32(image.clone(), PyramidOptions::new(pyr_levels + 1))
        .into_levels()
        .into_iter()
        .map(|level| LevelBundle::new(level, gradient))
        .collect()
}

#[cfg(feature = "parallel")]
fn build_pair(
    prev: &ImageF32,
    curr: &ImageF32,
    pyr_levels: usize,
    gradient: GradientOperator,
) -> (Vec<LevelBundle>, Vec<LevelBundle>) {
    rayon::join(
        || build_levels(prev, pyr_levels, gradient),
        || build_levels(curr, pyr_levels, gradient),
    )
}

#[cfg(not(feature = "parallel"))]
fn build_pair(
    prev: &ImageF32,
    curr: &ImageF32,
    pyr_levels: usize,
    gradient: GradientOperator,
) -> (Vec<LevelBundle>, Vec<LevelBundle>) {
    (
        build_levels(prev, pyr_levels, gradient),
        build_levels(curr, pyr_levels, gradient),
    )
}

/// Previous/current pyramids for one tracking session.
///
/// Create it once, call [`process`](Self::process) for every frame pair and
/// [`release`](Self::release) to free the rasters. A released storage can be
/// processed again.
#[derive(Clone, Debug)]
pub struct PyrLkStorage {
    pyr_levels: usize,
    gradient: GradientOperator,
    prev: Vec<LevelBundle>,
    curr: Vec<LevelBundle>,
    last_reused: bool,
    timings: TimingBreakdown,
}

impl PyrLkStorage {
    /// Storage for `pyr_levels` levels above full resolution (Sobel gradients).
    pub fn new(pyr_levels: usize) -> Self {
        Self {
            pyr_levels,
            gradient: GradientOperator::default(),
            prev: Vec::new(),
            curr: Vec::new(),
            last_reused: false,
            timings: TimingBreakdown::default(),
        }
    }

    /// Switch the derivative operator. Cached levels are dropped when it
    /// changes, since their gradients no longer match.
    pub fn with_gradient(mut self, gradient: GradientOperator) -> Self {
        if gradient != self.gradient {
            self.release();
        }
        self.gradient = gradient;
        self
    }

    /// Prepare the pyramids of `prev` and `curr`.
    ///
    /// When `prev` has the same samples as the current frame of the
    /// preceding call, the cached current levels become the previous levels
    /// and only `curr` is built.
    pub fn process(&mut self, prev: &ImageF32, curr: &ImageF32) -> FlowResult<()> {
        if prev.is_empty() {
            return Err(FlowError::EmptyImage {
                width: prev.w,
                height: prev.h,
                channels: prev.channels,
            });
        }
        if !prev.same_shape(curr) {
            return Err(FlowError::ImageMismatch {
                prev_w: prev.w,
                prev_h: prev.h,
                prev_c: prev.channels,
                curr_w: curr.w,
                curr_h: curr.h,
                curr_c: curr.channels,
            });
        }

        let start = Instant::now();
        let reusable = self
            .curr
            .first()
            .is_some_and(|level0| level0.image.same_content(prev));
        let mut timings = TimingBreakdown::default();
        if reusable {
            self.prev = std::mem::take(&mut self.curr);
            let t = Instant::now();
            self.curr = build_levels(curr, self.pyr_levels, self.gradient);
            timings.push("build_current", t.elapsed().as_secs_f64() * 1000.0);
            debug!(
                "PyrLkStorage::process reused previous pyramid ({} levels, {}x{})",
                self.pyr_levels + 1,
                prev.w,
                prev.h
            );
        } else {
            let t = Instant::now();
            let (p, c) = build_pair(prev, curr, self.pyr_levels, self.gradient);
            self.prev = p;
            self.curr = c;
            timings.push("build_both", t.elapsed().as_secs_f64() * 1000.0);
            debug!(
                "PyrLkStorage::process built both pyramids ({} levels, {}x{})",
                self.pyr_levels + 1,
                prev.w,
                prev.h
            );
        }
        timings.total_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.timings = timings;
        self.last_reused = reusable;
        Ok(())
    }

    /// Drop every cached raster.
    pub fn release(&mut self) {
        self.prev = Vec::new();
        self.curr = Vec::new();
        self.last_reused = false;
        self.timings = TimingBreakdown::default();
    }

    /// Number of levels above full resolution.
    pub fn pyr_levels(&self) -> usize {
        self.pyr_levels
    }

    pub fn gradient(&self) -> GradientOperator {
        self.gradient
    }

    pub fn is_processed(&self) -> bool {
        !self.prev.is_empty() && !self.curr.is_empty()
    }

    /// Whether the last `process` call reused the cached current pyramid.
    pub fn last_reused(&self) -> bool {
        self.last_reused
    }

    /// Build timings of the last `process` call.
    pub fn timings(&self) -> &TimingBreakdown {
        &self.timings
    }

    fn level_in(levels: &[LevelBundle], level: usize) -> FlowResult<&LevelBundle> {
        if levels.is_empty() {
            return Err(FlowError::StorageNotProcessed);
        }
        levels.get(level).ok_or(FlowError::LevelOutOfRange {
            level,
            max_level: levels.len() - 1,
        })
    }

    pub fn prev_level(&self, level: usize) -> FlowResult<&LevelBundle> {
        Self::level_in(&self.prev, level)
    }

    pub fn curr_level(&self, level: usize) -> FlowResult<&LevelBundle> {
        Self::level_in(&self.curr, level)
    }

    /// `(previous, current)` bundles of one level.
    pub fn level_pair(&self, level: usize) -> FlowResult<(&LevelBundle, &LevelBundle)> {
        Ok((self.prev_level(level)?, self.curr_level(level)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(w: usize, h: usize, offset: f32) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, offset + (x * 3 + y * 2) as f32);
            }
        }
        img
    }

    #[test]
    fn builds_requested_levels() {
        let mut storage = PyrLkStorage::new(2);
        assert!(!storage.is_processed());
        let a = gradient_image(40, 30, 0.0);
        let b = gradient_image(40, 30, 5.0);
        storage.process(&a, &b).expect("valid frames");
        assert!(storage.is_processed());
        assert!(!storage.last_reused());
        let dims: Vec<_> = (0..=2)
            .map(|l| {
                let bundle = storage.prev_level(l).expect("level exists");
                (bundle.width(), bundle.height())
            })
            .collect();
        assert_eq!(dims, vec![(40, 30), (20, 15), (10, 8)]);
        let (p, c) = storage.level_pair(0).expect("level 0");
        assert_eq!(p.image, a);
        assert_eq!(c.image, b);
        assert!((p.grad_x.get(10, 10) - 3.0).abs() < 1e-5);
        assert!(matches!(
            storage.curr_level(3),
            Err(FlowError::LevelOutOfRange {
                level: 3,
                max_level: 2
            })
        ));
    }

    #[test]
    fn sequential_pair_reuses_current_pyramid() {
        let mut storage = PyrLkStorage::new(1);
        let a = gradient_image(32, 32, 0.0);
        let b = gradient_image(32, 32, 7.0);
        let c = gradient_image(32, 32, 11.0);
        storage.process(&a, &b).expect("first pair");
        storage.process(&b.clone(), &c).expect("second pair");
        assert!(storage.last_reused(), "equal content should be reused");
        assert_eq!(storage.prev_level(0).expect("level").image, b);
        assert_eq!(storage.curr_level(0).expect("level").image, c);
        storage.process(&a, &c).expect("unrelated pair");
        assert!(!storage.last_reused());
    }

    #[test]
    fn release_drops_levels() {
        let mut storage = PyrLkStorage::new(1);
        let a = gradient_image(16, 16, 0.0);
        storage.process(&a, &a).expect("valid frames");
        storage.release();
        assert!(!storage.is_processed());
        assert!(matches!(
            storage.prev_level(0),
            Err(FlowError::StorageNotProcessed)
        ));
        storage.process(&a, &a).expect("storage is reusable after release");
        assert!(!storage.last_reused());
    }

    #[test]
    fn rejects_mismatched_or_empty_frames() {
        let mut storage = PyrLkStorage::new(0);
        let a = gradient_image(16, 16, 0.0);
        let b = gradient_image(16, 12, 0.0);
        assert!(matches!(
            storage.process(&a, &b),
            Err(FlowError::ImageMismatch { .. })
        ));
        let empty = ImageF32::new(0, 0);
        assert!(matches!(
            storage.process(&empty, &empty),
            Err(FlowError::EmptyImage { .. })
        ));
        assert!(!storage.is_processed());
    }
}
